use super::Tokenizer;
use super::TokenizerState::{
    AfterAttributeName, AfterAttributeValueQuoted, AttributeName, AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted, AttributeValueUnquoted, BeforeAttributeName, BeforeAttributeValue,
    BogusComment, Data, EndTagOpen, MarkupDeclarationOpen, SelfClosingStartTag, TagName,
};
use super::character_reference::CharacterReference;
use super::data_states::is_whitespace;
use crate::error::Fault;

const REPLACEMENT: char = '\u{FFFD}';

impl Tokenizer {
    /// Start a bogus comment whose data begins with the current character.
    pub(super) fn start_bogus_comment(&mut self) {
        self.comment.reset();
        self.comment.bogus = true;
        self.switch_to(BogusComment);
    }

    /// Emit the current tag and return to the data state.
    fn finish_tag(&mut self) -> Result<(), Fault> {
        self.cursor.advance();
        self.emit_tag()?;
        self.switch_to(Data);
        Ok(())
    }

    /// "EOF: This is an eof-in-tag parse error. Emit an end-of-file token."
    ///
    /// The unfinished tag is dropped.
    fn eof_in_tag(&mut self) {
        self.eof_error();
        self.switch_to(Data);
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    pub(super) fn handle_tag_open_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            // "U+0021 EXCLAMATION MARK (!): Switch to the markup declaration open state."
            Some('!') => self.advance_to(MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/): Switch to the end tag open state."
            Some('/') => self.advance_to(EndTagOpen),
            // "U+003F QUESTION MARK (?): This is an unexpected-question-mark-instead-of-tag-name
            // parse error. Create a comment token whose data is the empty string.
            // Reconsume in the bogus comment state."
            Some('?') => {
                self.error("unexpected question mark instead of tag name");
                self.start_bogus_comment();
            }
            // "ASCII alpha: Create a new start tag token, set its tag name to the
            // empty string. Reconsume in the tag name state."
            Some(_) if self.cursor.matches_letter() => {
                self.create_tag(true);
                self.switch_to(TagName);
            }
            // "EOF: This is an eof-before-tag-name parse error. Emit a U+003C
            // LESS-THAN SIGN character token and an end-of-file token."
            None => {
                self.eof_error();
                self.char_buffer.push('<');
                self.switch_to(Data);
            }
            // "Anything else: This is an invalid-first-character-of-tag-name parse
            // error. Emit a U+003C LESS-THAN SIGN character token. Reconsume in
            // the data state."
            Some(c) => {
                self.unexpected_character(c);
                self.char_buffer.push('<');
                self.switch_to(Data);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    pub(super) fn handle_end_tag_open_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(_) if self.cursor.matches_letter() => {
                self.create_tag(false);
                self.switch_to(TagName);
            }
            // "U+003E GREATER-THAN SIGN (>): This is a missing-end-tag-name parse
            // error. Switch to the data state."
            Some('>') => {
                self.error("missing end tag name");
                self.advance_to(Data);
            }
            None => {
                self.eof_error();
                self.char_buffer.push_str("</");
                self.switch_to(Data);
            }
            Some(c) => {
                self.unexpected_character(c);
                self.start_bogus_comment();
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    pub(super) fn handle_tag_name_state(&mut self) -> Result<(), Fault> {
        let name = self.cursor.consume_tag_name();
        self.tag.append_name(name);

        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(BeforeAttributeName),
            Some('/') => self.advance_to(SelfClosingStartTag),
            Some('>') => self.finish_tag()?,
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.tag.append_name_char(REPLACEMENT);
            }
            None => self.eof_in_tag(),
            Some(_) => return Err(Fault::Unreachable("tag name run stopped on a name character")),
        }
        Ok(())
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    pub(super) fn handle_before_attribute_name_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF: Reconsume in
            // the after attribute name state."
            Some('/' | '>') | None => self.switch_to(AfterAttributeName),
            // "U+003D EQUALS SIGN (=): This is an unexpected-equals-sign-before-attribute-name
            // parse error. Start a new attribute in the current tag token. Set that
            // attribute's name to the current input character, and its value to
            // the empty string. Switch to the attribute name state."
            Some('=') => {
                self.unexpected_character('=');
                self.start_attribute();
                self.tag.append_attribute_name_char('=');
                self.advance_to(AttributeName);
            }
            Some(_) => {
                self.start_attribute();
                self.switch_to(AttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    pub(super) fn handle_attribute_name_state(&mut self) -> Result<(), Fault> {
        let name = self.cursor.consume_to_any(b"\t\n\x0C\r /=>\0\"'<");
        self.tag.append_attribute_name(name);

        match self.cursor.current() {
            Some(c) if is_whitespace(c) || c == '/' || c == '>' => {
                self.switch_to(AfterAttributeName);
            }
            None => self.switch_to(AfterAttributeName),
            Some('=') => self.advance_to(BeforeAttributeValue),
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.tag.append_attribute_name_char(REPLACEMENT);
            }
            // "U+0022 QUOTATION MARK ("), U+0027 APOSTROPHE ('), U+003C LESS-THAN
            // SIGN (<): This is an unexpected-character-in-attribute-name parse
            // error. Treat it as per the "anything else" entry below."
            Some(c) => {
                self.unexpected_character(c);
                self.cursor.advance();
                self.tag.append_attribute_name_char(c);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    pub(super) fn handle_after_attribute_name_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('/') => self.advance_to(SelfClosingStartTag),
            Some('=') => self.advance_to(BeforeAttributeValue),
            Some('>') => self.finish_tag()?,
            None => self.eof_in_tag(),
            Some(_) => {
                self.start_attribute();
                self.switch_to(AttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    pub(super) fn handle_before_attribute_value_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.cursor.advance(),
            Some('"') => self.advance_to(AttributeValueDoubleQuoted),
            Some('\'') => self.advance_to(AttributeValueSingleQuoted),
            // "U+003E GREATER-THAN SIGN (>): This is a missing-attribute-value
            // parse error. Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.error("missing attribute value");
                self.finish_tag()?;
            }
            _ => self.switch_to(AttributeValueUnquoted),
        }
        Ok(())
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    pub(super) fn handle_attribute_value_double_quoted_state(&mut self) -> Result<(), Fault> {
        self.quoted_attribute_value('"')
    }

    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    pub(super) fn handle_attribute_value_single_quoted_state(&mut self) -> Result<(), Fault> {
        self.quoted_attribute_value('\'')
    }

    fn quoted_attribute_value(&mut self, quote: char) -> Result<(), Fault> {
        let delimiters: &[u8] = if quote == '"' { b"\"&\0" } else { b"'&\0" };
        let value = self.cursor.consume_to_any(delimiters);
        self.tag.append_attribute_value(value);

        match self.cursor.current() {
            Some(c) if c == quote => self.advance_to(AfterAttributeValueQuoted),
            Some('&') => {
                self.cursor.advance();
                self.attribute_reference(quote)?;
            }
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.tag.append_attribute_value_char(REPLACEMENT);
            }
            None => self.eof_in_tag(),
            Some(_) => return Err(Fault::Unreachable("attribute value run stopped early")),
        }
        Ok(())
    }

    /// "U+0026 AMPERSAND (&): Set the return state to the attribute value
    /// state. Switch to the character reference state."
    fn attribute_reference(&mut self, terminator: char) -> Result<(), Fault> {
        match self.consume_character_reference(Some(terminator), true)? {
            Some(CharacterReference::Named(text)) => self.tag.append_attribute_value(text),
            Some(CharacterReference::Numeric(c)) => self.tag.append_attribute_value_char(c),
            None => self.tag.append_attribute_value_char('&'),
        }
        Ok(())
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    pub(super) fn handle_attribute_value_unquoted_state(&mut self) -> Result<(), Fault> {
        let value = self.cursor.consume_to_any(b"\t\n\x0C\r &>\0\"'<=`");
        self.tag.append_attribute_value(value);

        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(BeforeAttributeName),
            Some('&') => {
                self.cursor.advance();
                self.attribute_reference('>')?;
            }
            Some('>') => self.finish_tag()?,
            Some('\0') => {
                self.null_error();
                self.cursor.advance();
                self.tag.append_attribute_value_char(REPLACEMENT);
            }
            None => self.eof_in_tag(),
            // "U+0022 QUOTATION MARK ("), U+0027 APOSTROPHE ('), U+003C LESS-THAN
            // SIGN (<), U+003D EQUALS SIGN (=), U+0060 GRAVE ACCENT (`): This is an
            // unexpected-character-in-unquoted-attribute-value parse error."
            Some(c) => {
                self.unexpected_character(c);
                self.cursor.advance();
                self.tag.append_attribute_value_char(c);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    pub(super) fn handle_after_attribute_value_quoted_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            Some(c) if is_whitespace(c) => self.advance_to(BeforeAttributeName),
            Some('/') => self.advance_to(SelfClosingStartTag),
            Some('>') => self.finish_tag()?,
            None => self.eof_in_tag(),
            // "This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.error("missing whitespace between attributes");
                self.switch_to(BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    pub(super) fn handle_self_closing_start_tag_state(&mut self) -> Result<(), Fault> {
        match self.cursor.current() {
            // "Set the self-closing flag of the current tag token. Switch to the
            // data state. Emit the current tag token."
            Some('>') => {
                self.tag.self_closing = true;
                self.finish_tag()?;
            }
            None => self.eof_in_tag(),
            // "This is an unexpected-solidus-in-tag parse error. Reconsume in the
            // before attribute name state."
            Some(c) => {
                self.unexpected_character(c);
                self.switch_to(BeforeAttributeName);
            }
        }
        Ok(())
    }
}
