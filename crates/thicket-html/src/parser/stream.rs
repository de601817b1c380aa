//! Token-level callback mode.
//!
//! Drives the tokenizer without building a tree. Payloads are borrowed for
//! the duration of one callback and recycled right after it returns.

use super::Flavor;
use super::tree_builder::TokenSink;
use crate::error::Fault;
use crate::tag::TagInfo;
use crate::tokenizer::{Characters, Comment, Doctype, Tag, Token, Tokenizer};

/// Receives tokens from a [`TokenStream`]. Every method defaults to doing nothing.
pub trait TokenHandler {
    /// A start tag was read.
    fn start_tag(&mut self, _tag: &Tag) {}
    /// An end tag was read.
    fn end_tag(&mut self, _tag: &Tag) {}
    /// A coalesced character run was read.
    fn text(&mut self, _text: &Characters) {}
    /// A comment was read.
    fn comment(&mut self, _comment: &Comment) {}
    /// A doctype was read.
    fn doctype(&mut self, _doctype: &Doctype) {}
    /// The input is exhausted. Called exactly once.
    fn end_of_input(&mut self) {}
}

/// Feeds a tokenizer into a [`TokenHandler`].
#[derive(Debug)]
pub struct TokenStream<H> {
    tokenizer: Tokenizer,
    handler: H,
    flavor: Flavor,
}

impl<H: TokenHandler> TokenStream<H> {
    /// Stream tokens from `tokenizer` into `handler`.
    pub const fn new(tokenizer: Tokenizer, flavor: Flavor, handler: H) -> Self {
        Self {
            tokenizer,
            handler,
            flavor,
        }
    }

    /// The tokenizer, for inspecting its diagnostics.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Give the handler back.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Split into the tokenizer and the handler.
    pub fn into_parts(self) -> (Tokenizer, H) {
        (self.tokenizer, self.handler)
    }

    /// HTML content models still apply without a tree: `<script>` content is
    /// not markup, so the tokenizer must be told.
    fn after_start_tag(&mut self, tag: &Tag) {
        if tag.self_closing {
            self.tokenizer.acknowledge_self_closing();
        } else if self.flavor == Flavor::Html
            && let Some(kind) = TagInfo::text_content_of(tag.normal_name())
        {
            self.tokenizer.enter_text_content(kind);
        }
    }
}

impl<H: TokenHandler> TokenSink for TokenStream<H> {
    fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.tokenizer
    }

    fn process(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::StartTag(tag) => {
                self.handler.start_tag(tag);
                self.after_start_tag(tag);
            }
            Token::EndTag(tag) => self.handler.end_tag(tag),
            Token::Characters(text) => self.handler.text(text),
            Token::Comment(comment) => self.handler.comment(comment),
            Token::Doctype(doctype) => self.handler.doctype(doctype),
            Token::EndOfInput => self.handler.end_of_input(),
        }
        Ok(true)
    }
}
