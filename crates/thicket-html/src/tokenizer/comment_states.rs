use super::Tokenizer;
use super::TokenizerState::{
    CDATASection, Comment, CommentEnd, CommentEndBang, CommentEndDash, CommentLessThanSign,
    CommentLessThanSignBang, CommentLessThanSignBangDash, CommentLessThanSignBangDashDash,
    CommentStart, CommentStartDash, DOCTYPE, Data,
};
use crate::error::Fault;

const REPLACEMENT: char = '\u{FFFD}';

impl Tokenizer {
    /// Emit the comment and return to the data state.
    fn finish_comment(&mut self) -> Result<(), Fault> {
        self.emit_comment()?;
        self.switch_to(Data);
        Ok(())
    }

    /// "EOF: This is an eof-in-comment parse error. Emit the current comment
    /// token. Emit an end-of-file token."
    fn eof_in_comment(&mut self) -> Result<(), Fault> {
        self.eof_error();
        self.finish_comment()
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    pub(super) fn handle_markup_declaration_open_state(&mut self) -> Result<(), Fault> {
        // "Two U+002D HYPHEN-MINUS characters (-): Consume those two characters,
        // create a comment token whose data is the empty string, and switch to
        // the comment start state."
        if self.cursor.match_consume("--") {
            self.comment.reset();
            self.switch_to(CommentStart);
        // "ASCII case-insensitive match for the word "DOCTYPE": Consume those
        // characters and switch to the DOCTYPE state."
        } else if self.cursor.match_consume_ignore_case("DOCTYPE") {
            self.switch_to(DOCTYPE);
        // "The string "[CDATA[" (the five uppercase letters "CDATA" with a
        // U+005B LEFT SQUARE BRACKET character before and after): Consume those
        // characters..." CDATA is honoured in both flavors.
        } else if self.cursor.match_consume("[CDATA[") {
            self.switch_to(CDATASection);
        } else {
            // "This is an incorrectly-opened-comment parse error. Create a
            // comment token whose data is the empty string. Switch to the bogus
            // comment state (don't consume anything in the current state)."
            //
            // The `!` is kept so declarations can be told apart downstream.
            self.error("incorrectly opened comment");
            self.start_bogus_comment();
            self.comment.data.push('!');
        }
        Ok(())
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    pub(super) fn handle_bogus_comment_state(&mut self) -> Result<(), Fault> {
        let data = self.cursor.consume_to_any(b">\0");
        self.comment.data.push_str(data);

        match self.cursor.current() {
            Some('>') => {
                self.cursor.advance();
                self.finish_comment()?;
            }
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.comment.data.push(REPLACEMENT);
            }
            // "EOF: Emit the comment. Emit an end-of-file token."
            None => self.finish_comment()?,
            Some(_) => return Err(Fault::Unreachable("bogus comment run stopped early")),
        }
        Ok(())
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => self.advance_to(CommentStartDash),
            // "This is an abrupt-closing-of-empty-comment parse error."
            Some('>') => {
                self.error("abrupt closing of empty comment");
                self.cursor.advance();
                self.finish_comment()?;
            }
            _ => self.switch_to(Comment),
        }
        Ok(())
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => self.advance_to(CommentEnd),
            Some('>') => {
                self.error("abrupt closing of empty comment");
                self.cursor.advance();
                self.finish_comment()?;
            }
            None => self.eof_in_comment()?,
            Some(_) => {
                self.comment.data.push('-');
                self.switch_to(Comment);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) -> Result<(), Fault> {
        let data = self.cursor.consume_to_any(b"<-\0");
        self.comment.data.push_str(data);

        match self.cursor.current() {
            Some('<') => {
                self.comment.data.push('<');
                self.advance_to(CommentLessThanSign);
            }
            Some('-') => self.advance_to(CommentEndDash),
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.comment.data.push(REPLACEMENT);
            }
            None => self.eof_in_comment()?,
            Some(_) => return Err(Fault::Unreachable("comment run stopped early")),
        }
        Ok(())
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    pub(super) fn handle_comment_less_than_sign_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('!') => {
                self.comment.data.push('!');
                self.advance_to(CommentLessThanSignBang);
            }
            Some('<') => {
                self.comment.data.push('<');
                self.cursor.advance();
            }
            _ => self.switch_to(Comment),
        }
        Ok(())
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    pub(super) fn handle_comment_less_than_sign_bang_state(&mut self) -> Result<(), Fault> {
        if self.cursor.matches('-') {
            self.advance_to(CommentLessThanSignBangDash);
        } else {
            self.switch_to(Comment);
        }
        Ok(())
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_state(&mut self) -> Result<(), Fault> {
        if self.cursor.matches('-') {
            self.advance_to(CommentLessThanSignBangDashDash);
        } else {
            self.switch_to(CommentEndDash);
        }
        Ok(())
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_dash_state(
        &mut self,
    ) -> Result<(), Fault> {
        // "Anything else: This is a nested-comment parse error. Reconsume in
        // the comment end state."
        if !matches!(self.cursor.current(), Some('>') | None) {
            self.error("nested comment");
        }
        self.switch_to(CommentEnd);
        Ok(())
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => self.advance_to(CommentEnd),
            None => self.eof_in_comment()?,
            Some(_) => {
                self.comment.data.push('-');
                self.switch_to(Comment);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('>') => {
                self.cursor.advance();
                self.finish_comment()?;
            }
            Some('!') => self.advance_to(CommentEndBang),
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment token's data."
            Some('-') => {
                self.comment.data.push('-');
                self.cursor.advance();
            }
            None => self.eof_in_comment()?,
            Some(_) => {
                self.comment.data.push_str("--");
                self.switch_to(Comment);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => {
                self.comment.data.push_str("--!");
                self.advance_to(CommentEndDash);
            }
            // "This is an incorrectly-closed-comment parse error."
            Some('>') => {
                self.error("incorrectly closed comment");
                self.cursor.advance();
                self.finish_comment()?;
            }
            None => self.eof_in_comment()?,
            Some(_) => {
                self.comment.data.push_str("--!");
                self.switch_to(Comment);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    ///
    /// Everything up to `]]>` is one CDATA character run.
    pub(super) fn handle_cdata_section_state(&mut self) -> Result<(), Fault> {
        let data = self.cursor.consume_to_str("]]>").to_owned();
        // "EOF: This is an eof-in-cdata parse error. Emit an end-of-file token."
        if !self.cursor.match_consume("]]>") {
            self.eof_error();
        }
        self.switch_to(Data);
        self.emit_cdata(data)
    }
}
