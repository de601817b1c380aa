use super::Tokenizer;
use super::TokenizerState::{
    AfterDOCTYPEName, AfterDOCTYPEPublicIdentifier, AfterDOCTYPEPublicKeyword,
    AfterDOCTYPESystemIdentifier, AfterDOCTYPESystemKeyword, BeforeDOCTYPEName,
    BeforeDOCTYPEPublicIdentifier, BeforeDOCTYPESystemIdentifier,
    BetweenDOCTYPEPublicAndSystemIdentifiers, BogusDOCTYPE, DOCTYPEName,
    DOCTYPEPublicIdentifierDoubleQuoted, DOCTYPEPublicIdentifierSingleQuoted,
    DOCTYPESystemIdentifierDoubleQuoted, DOCTYPESystemIdentifierSingleQuoted, Data,
};
use super::data_states::is_whitespace;
use super::token::DoctypeKeyword;
use crate::error::Fault;

const REPLACEMENT: char = '\u{FFFD}';

impl Tokenizer {
    /// Emit the DOCTYPE token and return to the data state.
    fn finish_doctype(&mut self) -> Result<(), Fault> {
        self.emit_doctype()?;
        self.switch_to(Data);
        Ok(())
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on. Switch to the
    /// data state. Emit the current DOCTYPE token."
    fn finish_doctype_quirky(&mut self) -> Result<(), Fault> {
        self.doctype.force_quirks = true;
        self.finish_doctype()
    }

    /// "EOF: This is an eof-in-doctype parse error." Force quirks and emit.
    fn eof_in_doctype(&mut self) -> Result<(), Fault> {
        self.eof_error();
        self.finish_doctype_quirky()
    }

    /// Force quirks and skip the rest of the declaration.
    fn bogus_doctype(&mut self, c: char) {
        self.unexpected_character(c);
        self.doctype.force_quirks = true;
        self.switch_to(BogusDOCTYPE);
    }

    fn identifier_mut(&mut self, which: DoctypeKeyword) -> &mut String {
        match which {
            DoctypeKeyword::Public => self.doctype.public_identifier_mut(),
            DoctypeKeyword::System => self.doctype.system_identifier_mut(),
        }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) -> Result<(), Fault> {
        self.doctype.reset();
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(BeforeDOCTYPEName),
            Some('>') => self.switch_to(BeforeDOCTYPEName),
            None => self.eof_in_doctype()?,
            // "This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            Some(_) => {
                self.error("missing whitespace before doctype name");
                self.switch_to(BeforeDOCTYPEName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.doctype.name_mut().push(REPLACEMENT);
                self.switch_to(DOCTYPEName);
            }
            // "This is a missing-doctype-name parse error."
            Some('>') => {
                self.error("missing doctype name");
                self.cursor.advance();
                self.finish_doctype_quirky()?;
            }
            None => self.eof_in_doctype()?,
            Some(_) => {
                let _ = self.doctype.name_mut();
                self.switch_to(DOCTYPEName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    ///
    /// The name is kept as written; consumers compare it ignoring case.
    pub(super) fn handle_doctype_name_state(&mut self) -> Result<(), Fault> {
        let run = self.cursor.consume_to_any(b"\t\n\x0C\r >\0");
        self.doctype.name_mut().push_str(run);

        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(AfterDOCTYPEName),
            Some('>') => {
                self.cursor.advance();
                self.finish_doctype()?;
            }
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.doctype.name_mut().push(REPLACEMENT);
            }
            None => self.eof_in_doctype()?,
            Some(_) => return Err(Fault::Unreachable("doctype name run stopped early")),
        }
        Ok(())
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('>') => {
                self.cursor.advance();
                self.finish_doctype()?;
            }
            None => self.eof_in_doctype()?,
            // "If the six characters starting from the current input character
            // are an ASCII case-insensitive match for the word "PUBLIC"..."
            Some(_) if self.cursor.match_consume_ignore_case("PUBLIC") => {
                self.doctype.pub_sys_key = Some(DoctypeKeyword::Public);
                self.switch_to(AfterDOCTYPEPublicKeyword);
            }
            Some(_) if self.cursor.match_consume_ignore_case("SYSTEM") => {
                self.doctype.pub_sys_key = Some(DoctypeKeyword::System);
                self.switch_to(AfterDOCTYPESystemKeyword);
            }
            // "This is an invalid-character-sequence-after-doctype-name parse error."
            Some(c) => self.bogus_doctype(c),
        }
        Ok(())
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    pub(super) fn handle_after_doctype_public_keyword_state(&mut self) -> Result<(), Fault> {
        self.after_doctype_keyword(DoctypeKeyword::Public, BeforeDOCTYPEPublicIdentifier)
    }

    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_system_keyword_state(&mut self) -> Result<(), Fault> {
        self.after_doctype_keyword(DoctypeKeyword::System, BeforeDOCTYPESystemIdentifier)
    }

    fn after_doctype_keyword(
        &mut self,
        which: DoctypeKeyword,
        before_identifier: super::TokenizerState,
    ) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(before_identifier),
            // "This is a missing-whitespace-after-doctype-*-keyword parse error."
            Some(quote @ ('"' | '\'')) => {
                self.error(format_args!("missing whitespace after doctype {which} keyword"));
                self.open_identifier(which, quote);
            }
            _ => self.before_doctype_identifier(which)?,
        }
        Ok(())
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    pub(super) fn handle_before_doctype_public_identifier_state(&mut self) -> Result<(), Fault> {
        self.before_doctype_identifier(DoctypeKeyword::Public)
    }

    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_system_identifier_state(&mut self) -> Result<(), Fault> {
        self.before_doctype_identifier(DoctypeKeyword::System)
    }

    fn before_doctype_identifier(&mut self, which: DoctypeKeyword) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some(quote @ ('"' | '\'')) => self.open_identifier(which, quote),
            // "This is a missing-doctype-*-identifier parse error."
            Some('>') => {
                self.error(format_args!("missing doctype {which} identifier"));
                self.cursor.advance();
                self.finish_doctype_quirky()?;
            }
            None => self.eof_in_doctype()?,
            // "This is a missing-quote-before-doctype-*-identifier parse error."
            Some(c) => self.bogus_doctype(c),
        }
        Ok(())
    }

    /// "Set the current DOCTYPE token's identifier to the empty string (not
    /// missing), then switch to the identifier (quoted) state."
    fn open_identifier(&mut self, which: DoctypeKeyword, quote: char) {
        let _ = self.identifier_mut(which);
        let next = match (which, quote) {
            (DoctypeKeyword::Public, '"') => DOCTYPEPublicIdentifierDoubleQuoted,
            (DoctypeKeyword::Public, _) => DOCTYPEPublicIdentifierSingleQuoted,
            (DoctypeKeyword::System, '"') => DOCTYPESystemIdentifierDoubleQuoted,
            (DoctypeKeyword::System, _) => DOCTYPESystemIdentifierSingleQuoted,
        };
        self.advance_to(next);
    }

    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    pub(super) fn handle_doctype_public_identifier_double_quoted_state(
        &mut self,
    ) -> Result<(), Fault> {
        self.quoted_identifier(DoctypeKeyword::Public, b'"')
    }

    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_public_identifier_single_quoted_state(
        &mut self,
    ) -> Result<(), Fault> {
        self.quoted_identifier(DoctypeKeyword::Public, b'\'')
    }

    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    pub(super) fn handle_doctype_system_identifier_double_quoted_state(
        &mut self,
    ) -> Result<(), Fault> {
        self.quoted_identifier(DoctypeKeyword::System, b'"')
    }

    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_system_identifier_single_quoted_state(
        &mut self,
    ) -> Result<(), Fault> {
        self.quoted_identifier(DoctypeKeyword::System, b'\'')
    }

    fn quoted_identifier(&mut self, which: DoctypeKeyword, quote: u8) -> Result<(), Fault> {
        let run = self.cursor.consume_to_any(&[quote, b'>', 0]);
        match which {
            DoctypeKeyword::Public => self.doctype.public_identifier_mut().push_str(run),
            DoctypeKeyword::System => self.doctype.system_identifier_mut().push_str(run),
        }

        match self.cursor.current() {
            Some(c) if c == char::from(quote) => {
                let next = match which {
                    DoctypeKeyword::Public => AfterDOCTYPEPublicIdentifier,
                    DoctypeKeyword::System => AfterDOCTYPESystemIdentifier,
                };
                self.advance_to(next);
            }
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.identifier_mut(which).push(REPLACEMENT);
            }
            // "This is an abrupt-doctype-*-identifier parse error."
            Some('>') => {
                self.error(format_args!("abrupt doctype {which} identifier"));
                self.cursor.advance();
                self.finish_doctype_quirky()?;
            }
            None => self.eof_in_doctype()?,
            Some(_) => return Err(Fault::Unreachable("doctype identifier run stopped early")),
        }
        Ok(())
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => {
                self.advance_to(BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            // "This is a missing-whitespace-between-doctype-public-and-system-identifiers
            // parse error."
            Some(quote @ ('"' | '\'')) => {
                self.error("missing whitespace between doctype public and system identifiers");
                self.open_identifier(DoctypeKeyword::System, quote);
            }
            _ => self.between_doctype_identifiers()?,
        }
        Ok(())
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(
        &mut self,
    ) -> Result<(), Fault> {
        self.between_doctype_identifiers()
    }

    fn between_doctype_identifiers(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('>') => {
                self.cursor.advance();
                self.finish_doctype()?;
            }
            Some(quote @ ('"' | '\'')) => self.open_identifier(DoctypeKeyword::System, quote),
            None => self.eof_in_doctype()?,
            Some(c) => self.bogus_doctype(c),
        }
        Ok(())
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('>') => {
                self.cursor.advance();
                self.finish_doctype()?;
            }
            None => self.eof_in_doctype()?,
            // "This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not
            // set the current DOCTYPE token's force-quirks flag to on.)"
            Some(c) => {
                self.unexpected_character(c);
                self.switch_to(BogusDOCTYPE);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) -> Result<(), Fault> {
        let _ = self.cursor.consume_to_any(b">\0");
        match self.cursor.current() {
            Some('>') => {
                self.cursor.advance();
                self.finish_doctype()?;
            }
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
            }
            None => self.finish_doctype()?,
            Some(_) => return Err(Fault::Unreachable("bogus doctype run stopped early")),
        }
        Ok(())
    }
}
