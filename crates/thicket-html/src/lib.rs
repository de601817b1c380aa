//! Forgiving HTML and XML parsing into an arena document tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Every state of the state machine, including script data escapes and CDATA
//!   - Named and numeric character references against the full reference table
//!   - Reusable tokens: one token in flight, buffers handed back after use
//!
//! - **Tree Builders** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - HTML: insertion modes, implied elements, foster parenting, the
//!     adoption agency algorithm, quirks mode classification
//!   - XML: elements nest as written, declarations and CDATA kept as nodes
//!
//! - **Token streaming** for callers that want tokens without a tree
//!
//! # Not Implemented
//!
//! - Template contents and foreign (SVG/MathML) content are parsed as
//!   ordinary elements
//! - Scripting: `<noscript>` is always parsed as markup
//! - Encoding sniffing: byte input is decoded as UTF-8
//!
//! # Example
//! ```
//! let tree = thicket_html::parse("<!DOCTYPE html><p>Hi &amp; bye", "").unwrap();
//! let body = tree.body().unwrap();
//! assert_eq!(tree.text_content(body), "Hi & bye");
//! ```

/// Read head over the input text.
pub mod cursor;
/// Named character reference table.
pub mod entities;
/// Invariant violations.
pub mod error;
/// Tree construction and the parser entry points.
pub mod parser;
/// Static per-tag metadata.
pub mod tag;
/// The tokenizer state machine and its tokens.
pub mod tokenizer;

pub use cursor::Cursor;
pub use error::Fault;
pub use parser::{
    Flavor, HtmlTreeBuilder, InsertionMode, Parser, TokenHandler, TokenSink, TokenStream,
    XmlTreeBuilder, print_tree,
};
pub use tag::{TagInfo, TextContent};
pub use tokenizer::{
    Characters, Comment, Doctype, Tag, Token, TokenKind, Tokenizer, TokenizerState,
};

use thicket_dom::DomTree;

/// Parse an HTML document with default settings.
///
/// # Errors
///
/// Only on a [`Fault`]; malformed markup always yields a tree.
pub fn parse(html: &str, base_uri: &str) -> Result<DomTree, Fault> {
    Parser::html().parse_input(html, base_uri)
}

/// Parse an XML document with default settings.
///
/// # Errors
///
/// Only on a [`Fault`]; malformed markup always yields a tree.
pub fn parse_xml(xml: &str, base_uri: &str) -> Result<DomTree, Fault> {
    Parser::xml().parse_input(xml, base_uri)
}
