use std::fmt;
use std::mem;

use thicket_common::ParseError;

use super::token::{Characters, Token};
use super::{Tokenizer, TokenizerState};
use crate::error::Fault;

impl Tokenizer {
    /// Record a parse error at the current position.
    ///
    /// Nothing is formatted once the error list is full.
    pub(super) fn error(&mut self, message: impl fmt::Display) {
        if !self.errors.can_add_error() {
            return;
        }
        let message = message.to_string();
        log::debug!(target: "thicket::tokenizer", "parse error at {}: {message}", self.cursor.pos());
        let _ = self.errors.push(ParseError::new(self.cursor.pos(), message));
    }

    /// "This is an unexpected-character parse error."
    pub(super) fn unexpected_character(&mut self, c: char) {
        let state = self.state;
        self.error(format_args!("unexpected character {c:?} in input state [{state}]"));
    }

    /// "This is an eof-in-* parse error."
    pub(super) fn eof_error(&mut self) {
        let state = self.state;
        self.error(format_args!("unexpectedly reached end of file (EOF) in input state [{state}]"));
    }

    /// "This is an unexpected-null-character parse error."
    pub(super) fn null_error(&mut self) {
        let state = self.state;
        self.error(format_args!("unexpected null character in input state [{state}]"));
    }

    /// Change state without logging; used inside the state machine.
    pub(super) const fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    /// Skip the current character and switch to `state`.
    pub(super) fn advance_to(&mut self, state: TokenizerState) {
        self.cursor.advance();
        self.state = state;
    }

    fn emit(&mut self, token: Token) -> Result<(), Fault> {
        if self.pending.is_some() {
            return Err(Fault::EmitWhilePending);
        }
        self.pending = Some(token);
        Ok(())
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    ///
    /// "Create a new start tag token, set its tag name to the empty string."
    /// (or end tag token when `start` is false)
    pub(super) fn create_tag(&mut self, start: bool) {
        self.tag.reset();
        self.tag_is_start = start;
    }

    /// Emit the current tag token.
    pub(super) fn emit_tag(&mut self) -> Result<(), Fault> {
        if let Some(duplicate) = self.tag.finalize() {
            self.error(format_args!("dropped duplicate attribute [{duplicate}]"));
        }
        let tag = mem::take(&mut self.tag);
        let token = if self.tag_is_start {
            self.last_start_tag_name.clear();
            self.last_start_tag_name.push_str(tag.normal_name());
            Token::StartTag(tag)
        } else {
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            if !tag.attributes.is_empty() {
                self.error(format_args!("end tag [{}] has attributes", tag.name));
            }
            // "When an end tag token is emitted with its self-closing flag
            // set, that is an end-tag-with-trailing-solidus parse error."
            if tag.self_closing {
                self.error(format_args!("end tag [{}] has a trailing solidus", tag.name));
            }
            Token::EndTag(tag)
        };
        self.emit(token)
    }

    /// Flush the pending attribute, reporting a dropped duplicate.
    pub(super) fn start_attribute(&mut self) {
        if let Some(duplicate) = self.tag.new_attribute() {
            self.error(format_args!("dropped duplicate attribute [{duplicate}]"));
        }
    }

    pub(super) fn emit_comment(&mut self) -> Result<(), Fault> {
        let comment = mem::take(&mut self.comment);
        self.emit(Token::Comment(comment))
    }

    pub(super) fn emit_doctype(&mut self) -> Result<(), Fault> {
        let doctype = mem::take(&mut self.doctype);
        self.emit(Token::Doctype(doctype))
    }

    /// "Emit an end-of-file token." The state stays put, so later reads
    /// emit it again.
    pub(super) fn emit_eof(&mut self) -> Result<(), Fault> {
        self.emit(Token::EndOfInput)
    }

    pub(super) fn emit_cdata(&mut self, data: String) -> Result<(), Fault> {
        self.emit(Token::Characters(Characters { data, cdata: true }))
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag(&self) -> bool {
        !self.last_start_tag_name.is_empty() && self.tag.normal_name() == self.last_start_tag_name
    }

    /// Flush `</` and the temporary buffer as character data.
    pub(super) fn flush_end_tag_attempt(&mut self) {
        self.char_buffer.push_str("</");
        self.char_buffer.push_str(&self.temporary_buffer);
    }
}
