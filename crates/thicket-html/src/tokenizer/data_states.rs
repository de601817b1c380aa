use super::Tokenizer;
use super::TokenizerState::{
    BeforeAttributeName, CharacterReferenceInData, CharacterReferenceInRCDATA, Data,
    RAWTEXTEndTagName, RAWTEXTEndTagOpen, RAWTEXTLessThanSign, RCDATAEndTagName,
    RCDATAEndTagOpen, RCDATALessThanSign, ScriptData, ScriptDataDoubleEscapeEnd,
    ScriptDataDoubleEscapeStart, ScriptDataDoubleEscaped, ScriptDataDoubleEscapedDash,
    ScriptDataDoubleEscapedDashDash, ScriptDataDoubleEscapedLessThanSign, ScriptDataEndTagName,
    ScriptDataEndTagOpen, ScriptDataEscapeStart, ScriptDataEscapeStartDash, ScriptDataEscaped,
    ScriptDataEscapedDash, ScriptDataEscapedDashDash, ScriptDataEscapedEndTagName,
    ScriptDataEscapedEndTagOpen, ScriptDataEscapedLessThanSign, ScriptDataLessThanSign,
    SelfClosingStartTag, TagOpen, RAWTEXT, RCDATA,
};
use super::TokenizerState;
use crate::error::Fault;

/// "U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF), U+000C FORM
/// FEED (FF), U+0020 SPACE"
pub(super) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

const REPLACEMENT: char = '\u{FFFD}';

impl Tokenizer {
    /// "This is an unexpected-null-character parse error. Emit a U+FFFD
    /// REPLACEMENT CHARACTER character token."
    fn replace_null(&mut self) {
        self.null_error();
        self.cursor.advance();
        self.char_buffer.push(REPLACEMENT);
    }

    /// "This is an eof-in-* parse error. Emit an end-of-file token."
    ///
    /// Hands over to the data state, which emits the end-of-file token.
    fn eof_in_text(&mut self) {
        self.eof_error();
        self.switch_to(Data);
    }

    /// Consume the current character into the character buffer.
    fn buffer_current(&mut self) {
        if let Some(c) = self.cursor.consume() {
            self.char_buffer.push(c);
        }
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    pub(super) fn handle_data_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            // "U+0026 AMPERSAND (&): Set the return state to the data state.
            // Switch to the character reference state."
            Some('&') => self.advance_to(CharacterReferenceInData),
            // "U+003C LESS-THAN SIGN (<): Switch to the tag open state."
            Some('<') => self.advance_to(TagOpen),
            // "U+0000 NULL: This is an unexpected-null-character parse error.
            // Emit the current input character as a character token."
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.char_buffer.push('\0');
            }
            // "EOF: Emit an end-of-file token."
            None => self.emit_eof()?,
            Some(_) => {
                let data = self.cursor.consume_data();
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// returning to the data state.
    pub(super) fn handle_character_reference_in_data_state(&mut self) -> Result<(), Fault> {
        self.reference_into_buffer()?;
        self.switch_to(Data);
        Ok(())
    }

    /// Character reference state returning to RCDATA.
    pub(super) fn handle_character_reference_in_rcdata_state(&mut self) -> Result<(), Fault> {
        self.reference_into_buffer()?;
        self.switch_to(RCDATA);
        Ok(())
    }

    fn reference_into_buffer(&mut self) -> Result<(), Fault> {
        match self.consume_character_reference(None, false)? {
            Some(reference) => reference.push_to(&mut self.char_buffer),
            None => self.char_buffer.push('&'),
        }
        Ok(())
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    pub(super) fn handle_rcdata_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('&') => self.advance_to(CharacterReferenceInRCDATA),
            Some('<') => self.advance_to(RCDATALessThanSign),
            Some('\0') => self.replace_null(),
            None => self.emit_eof()?,
            Some(_) => {
                let data = self.cursor.consume_to_any(b"&<\0");
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    pub(super) fn handle_rawtext_state(&mut self) -> Result<(), Fault> {
        self.raw_data(RAWTEXTLessThanSign)
    }

    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    pub(super) fn handle_script_data_state(&mut self) -> Result<(), Fault> {
        self.raw_data(ScriptDataLessThanSign)
    }

    fn raw_data(&mut self, less_than_state: TokenizerState) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('<') => self.advance_to(less_than_state),
            Some('\0') => self.replace_null(),
            None => self.emit_eof()?,
            Some(_) => {
                let data = self.cursor.consume_raw_data();
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    pub(super) fn handle_plaintext_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('\0') => self.replace_null(),
            None => self.emit_eof()?,
            Some(_) => {
                let data = self.cursor.consume_to(b'\0');
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    // ===== RCDATA and RAWTEXT end tags =====

    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    pub(super) fn handle_rcdata_less_than_sign_state(&mut self) -> Result<(), Fault> {
        self.less_than_in_text(RCDATAEndTagOpen, RCDATA);
        Ok(())
    }

    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    pub(super) fn handle_rawtext_less_than_sign_state(&mut self) -> Result<(), Fault> {
        self.less_than_in_text(RAWTEXTEndTagOpen, RAWTEXT);
        Ok(())
    }

    /// "U+002F SOLIDUS (/): Set the temporary buffer to the empty string.
    /// Switch to the ... end tag open state. Anything else: Emit a U+003C
    /// LESS-THAN SIGN character token. Reconsume in the ... state."
    fn less_than_in_text(&mut self, end_tag_open: TokenizerState, text: TokenizerState) {
        if self.cursor.matches('/') {
            self.temporary_buffer.clear();
            self.advance_to(end_tag_open);
        } else {
            self.char_buffer.push('<');
            self.switch_to(text);
        }
    }

    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    pub(super) fn handle_rcdata_end_tag_open_state(&mut self) -> Result<(), Fault> {
        self.end_tag_open_in_text(RCDATAEndTagName, RCDATA);
        Ok(())
    }

    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    pub(super) fn handle_rawtext_end_tag_open_state(&mut self) -> Result<(), Fault> {
        self.end_tag_open_in_text(RAWTEXTEndTagName, RAWTEXT);
        Ok(())
    }

    /// [§ 13.2.5.16 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    pub(super) fn handle_script_data_end_tag_open_state(&mut self) -> Result<(), Fault> {
        self.end_tag_open_in_text(ScriptDataEndTagName, ScriptData);
        Ok(())
    }

    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    pub(super) fn handle_script_data_escaped_end_tag_open_state(&mut self) -> Result<(), Fault> {
        self.end_tag_open_in_text(ScriptDataEscapedEndTagName, ScriptDataEscaped);
        Ok(())
    }

    /// "ASCII alpha: Create a new end tag token, set its tag name to the empty
    /// string. Reconsume in the ... end tag name state. Anything else: Emit a
    /// U+003C LESS-THAN SIGN character token and a U+002F SOLIDUS character
    /// token. Reconsume in the ... state."
    fn end_tag_open_in_text(&mut self, end_tag_name: TokenizerState, text: TokenizerState) {
        if self.cursor.matches_letter() {
            self.create_tag(false);
            self.switch_to(end_tag_name);
        } else {
            self.char_buffer.push_str("</");
            self.switch_to(text);
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    pub(super) fn handle_rcdata_end_tag_name_state(&mut self) -> Result<(), Fault> {
        self.end_tag_name_in_text(RCDATA)
    }

    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    pub(super) fn handle_rawtext_end_tag_name_state(&mut self) -> Result<(), Fault> {
        self.end_tag_name_in_text(RAWTEXT)
    }

    /// [§ 13.2.5.17 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    pub(super) fn handle_script_data_end_tag_name_state(&mut self) -> Result<(), Fault> {
        self.end_tag_name_in_text(ScriptData)
    }

    /// [§ 13.2.5.25 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    pub(super) fn handle_script_data_escaped_end_tag_name_state(&mut self) -> Result<(), Fault> {
        self.end_tag_name_in_text(ScriptDataEscaped)
    }

    /// Shared body of the four end tag name states. Only an appropriate end
    /// tag leaves the text; anything else is flushed back as characters.
    fn end_tag_name_in_text(&mut self, text: TokenizerState) -> Result<(), Fault> {
        if self.cursor.matches_letter() {
            let letters = self.cursor.consume_letter_sequence();
            self.tag.append_name(letters);
            self.temporary_buffer.push_str(letters);
            return Ok(());
        }

        if self.is_appropriate_end_tag() {
            match self.cursor.current() {
                Some(c) if is_whitespace(c) => {
                    self.advance_to(BeforeAttributeName);
                    return Ok(());
                }
                Some('/') => {
                    self.advance_to(SelfClosingStartTag);
                    return Ok(());
                }
                Some('>') => {
                    self.cursor.advance();
                    self.emit_tag()?;
                    self.switch_to(Data);
                    return Ok(());
                }
                _ => {}
            }
        }

        self.flush_end_tag_attempt();
        self.switch_to(text);
        Ok(())
    }

    // ===== Script data escaping =====

    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    pub(super) fn handle_script_data_less_than_sign_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('/') => {
                self.temporary_buffer.clear();
                self.advance_to(ScriptDataEndTagOpen);
            }
            // "Emit a U+003C LESS-THAN SIGN character token and a U+0021
            // EXCLAMATION MARK character token."
            Some('!') => {
                self.char_buffer.push_str("<!");
                self.advance_to(ScriptDataEscapeStart);
            }
            _ => {
                self.char_buffer.push('<');
                self.switch_to(ScriptData);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    pub(super) fn handle_script_data_escape_start_state(&mut self) -> Result<(), Fault> {
        self.dash_or_return(ScriptDataEscapeStartDash, ScriptData);
        Ok(())
    }

    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    pub(super) fn handle_script_data_escape_start_dash_state(&mut self) -> Result<(), Fault> {
        self.dash_or_return(ScriptDataEscapedDashDash, ScriptData);
        Ok(())
    }

    fn dash_or_return(&mut self, on_dash: TokenizerState, otherwise: TokenizerState) {
        if self.cursor.matches('-') {
            self.char_buffer.push('-');
            self.advance_to(on_dash);
        } else {
            self.switch_to(otherwise);
        }
    }

    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    pub(super) fn handle_script_data_escaped_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => {
                self.char_buffer.push('-');
                self.advance_to(ScriptDataEscapedDash);
            }
            Some('<') => self.advance_to(ScriptDataEscapedLessThanSign),
            Some('\0') => self.replace_null(),
            None => self.eof_in_text(),
            Some(_) => {
                let data = self.cursor.consume_to_any(b"-<\0");
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    pub(super) fn handle_script_data_escaped_dash_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => {
                self.char_buffer.push('-');
                self.advance_to(ScriptDataEscapedDashDash);
            }
            Some('<') => self.advance_to(ScriptDataEscapedLessThanSign),
            Some('\0') => {
                self.replace_null();
                self.switch_to(ScriptDataEscaped);
            }
            None => self.eof_in_text(),
            Some(_) => {
                self.buffer_current();
                self.switch_to(ScriptDataEscaped);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    pub(super) fn handle_script_data_escaped_dash_dash_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => self.buffer_current(),
            Some('<') => self.advance_to(ScriptDataEscapedLessThanSign),
            Some('>') => {
                self.char_buffer.push('>');
                self.advance_to(ScriptData);
            }
            Some('\0') => {
                self.replace_null();
                self.switch_to(ScriptDataEscaped);
            }
            None => self.eof_in_text(),
            Some(_) => {
                self.buffer_current();
                self.switch_to(ScriptDataEscaped);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    pub(super) fn handle_script_data_escaped_less_than_sign_state(&mut self) -> Result<(), Fault> {
        if self.cursor.matches('/') {
            self.temporary_buffer.clear();
            self.advance_to(ScriptDataEscapedEndTagOpen);
        } else if self.cursor.matches_letter() {
            // "Set the temporary buffer to the empty string. Emit a U+003C
            // LESS-THAN SIGN character token. Reconsume in the script data
            // double escape start state."
            self.temporary_buffer.clear();
            self.char_buffer.push('<');
            self.switch_to(ScriptDataDoubleEscapeStart);
        } else {
            self.char_buffer.push('<');
            self.switch_to(ScriptDataEscaped);
        }
        Ok(())
    }

    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    pub(super) fn handle_script_data_double_escape_start_state(&mut self) -> Result<(), Fault> {
        self.double_escape_boundary(ScriptDataDoubleEscaped, ScriptDataEscaped);
        Ok(())
    }

    /// [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    pub(super) fn handle_script_data_double_escape_end_state(&mut self) -> Result<(), Fault> {
        self.double_escape_boundary(ScriptDataEscaped, ScriptDataDoubleEscaped);
        Ok(())
    }

    /// "U+0009 ... U+0020 SPACE, U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN
    /// (>): If the temporary buffer is the string "script", then switch to
    /// the `on_script` state. Otherwise, switch to the `otherwise` state.
    /// Emit the current input character as a character token."
    fn double_escape_boundary(&mut self, on_script: TokenizerState, otherwise: TokenizerState) {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) || c == '/' || c == '>' => {
                self.buffer_current();
                if self.temporary_buffer.eq_ignore_ascii_case("script") {
                    self.switch_to(on_script);
                } else {
                    self.switch_to(otherwise);
                }
            }
            Some(_) if self.cursor.matches_letter() => {
                let letters = self.cursor.consume_letter_sequence();
                self.char_buffer.push_str(letters);
                self.temporary_buffer.push_str(letters);
            }
            _ => self.switch_to(otherwise),
        }
    }

    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    pub(super) fn handle_script_data_double_escaped_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => {
                self.char_buffer.push('-');
                self.advance_to(ScriptDataDoubleEscapedDash);
            }
            Some('<') => {
                self.char_buffer.push('<');
                self.advance_to(ScriptDataDoubleEscapedLessThanSign);
            }
            Some('\0') => self.replace_null(),
            None => self.eof_in_text(),
            Some(_) => {
                let data = self.cursor.consume_to_any(b"-<\0");
                self.char_buffer.push_str(data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    pub(super) fn handle_script_data_double_escaped_dash_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => {
                self.char_buffer.push('-');
                self.advance_to(ScriptDataDoubleEscapedDashDash);
            }
            Some('<') => {
                self.char_buffer.push('<');
                self.advance_to(ScriptDataDoubleEscapedLessThanSign);
            }
            Some('\0') => {
                self.replace_null();
                self.switch_to(ScriptDataDoubleEscaped);
            }
            None => self.eof_in_text(),
            Some(_) => {
                self.buffer_current();
                self.switch_to(ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    pub(super) fn handle_script_data_double_escaped_dash_dash_state(
        &mut self,
    ) -> Result<(), Fault> {
        match self.cursor.current() {
            Some('-') => self.buffer_current(),
            Some('<') => {
                self.char_buffer.push('<');
                self.advance_to(ScriptDataDoubleEscapedLessThanSign);
            }
            Some('>') => {
                self.char_buffer.push('>');
                self.advance_to(ScriptData);
            }
            Some('\0') => {
                self.replace_null();
                self.switch_to(ScriptDataDoubleEscaped);
            }
            None => self.eof_in_text(),
            Some(_) => {
                self.buffer_current();
                self.switch_to(ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    pub(super) fn handle_script_data_double_escaped_less_than_sign_state(
        &mut self,
    ) -> Result<(), Fault> {
        if self.cursor.matches('/') {
            self.char_buffer.push('/');
            self.temporary_buffer.clear();
            self.advance_to(ScriptDataDoubleEscapeEnd);
        } else {
            self.switch_to(ScriptDataDoubleEscaped);
        }
        Ok(())
    }
}
