//! Tree construction and the parser entry points.
//!
//! A [`Parser`] pairs a [`Tokenizer`] with one of the token consumers:
//! - [`HtmlTreeBuilder`] for HTML, with insertion modes and error recovery
//! - [`XmlTreeBuilder`] for XML, with one implicit mode
//! - [`TokenStream`] for callers that want tokens without a tree

/// HTML tree construction.
pub mod html;
/// Token-level callback mode.
pub mod stream;
/// The token consumer trait and state shared by the tree builders.
pub mod tree_builder;
/// XML tree construction.
pub mod xml;

use std::fmt::Write;

use thicket_common::{ParseErrorList, ParseSettings};
use thicket_dom::{DomTree, NodeData, NodeId};

pub use html::{HtmlTreeBuilder, InsertionMode};
pub use stream::{TokenHandler, TokenStream};
pub use tree_builder::TokenSink;
pub use xml::XmlTreeBuilder;

use crate::cursor::Cursor;
use crate::error::Fault;
use crate::tokenizer::Tokenizer;

/// Which tree construction rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// HTML: implied elements, insertion modes, content models.
    Html,
    /// XML: elements nest exactly as written.
    Xml,
}

/// Parse configuration and the diagnostics of the last parse.
///
/// # Example
/// ```
/// use thicket_html::Parser;
///
/// let mut parser = Parser::html().track_errors(10);
/// let tree = parser.parse_input("<p>unclosed", "").unwrap();
/// assert!(tree.body().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    flavor: Flavor,
    settings: ParseSettings,
    max_errors: usize,
    errors: ParseErrorList,
}

impl Parser {
    /// An HTML parser: names fold to lowercase, diagnostics are off.
    #[must_use]
    pub const fn html() -> Self {
        Self::new(Flavor::Html, ParseSettings::HTML_DEFAULT)
    }

    /// An XML parser: names keep their case, diagnostics are off.
    #[must_use]
    pub const fn xml() -> Self {
        Self::new(Flavor::Xml, ParseSettings::PRESERVE_CASE)
    }

    const fn new(flavor: Flavor, settings: ParseSettings) -> Self {
        Self {
            flavor,
            settings,
            max_errors: 0,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// Replace the case folding policy.
    #[must_use]
    pub const fn with_settings(mut self, settings: ParseSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Keep up to `max` diagnostics per parse. Zero turns tracking off.
    #[must_use]
    pub const fn track_errors(mut self, max: usize) -> Self {
        self.max_errors = max;
        self
    }

    /// The tree construction rules in use.
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// The case folding policy in use.
    #[must_use]
    pub const fn settings(&self) -> ParseSettings {
        self.settings
    }

    /// Diagnostics from the most recent call.
    #[must_use]
    pub const fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    fn tokenizer(&self, cursor: Cursor) -> Tokenizer {
        Tokenizer::with_errors(cursor, ParseErrorList::tracking(self.max_errors))
    }

    /// Parse `input` into a document. `base_uri` is stored on every node.
    ///
    /// # Errors
    ///
    /// Only on a [`Fault`]. Malformed markup is recovered from and recorded
    /// in [`Parser::errors`].
    pub fn parse_input(&mut self, input: &str, base_uri: &str) -> Result<DomTree, Fault> {
        self.parse_cursor(Cursor::new(input), base_uri)
    }

    /// Parse raw bytes. Invalid UTF-8 becomes U+FFFD; no charset sniffing is done.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse_input`].
    pub fn parse_bytes(&mut self, input: &[u8], base_uri: &str) -> Result<DomTree, Fault> {
        self.parse_cursor(Cursor::from_bytes(input), base_uri)
    }

    fn parse_cursor(&mut self, cursor: Cursor, base_uri: &str) -> Result<DomTree, Fault> {
        log::debug!(
            target: "thicket::parser",
            "parsing {} bytes as {:?}",
            cursor.len(),
            self.flavor
        );
        let tokenizer = self.tokenizer(cursor);
        let (tree, errors) = match self.flavor {
            Flavor::Html => {
                let mut builder = HtmlTreeBuilder::new(tokenizer, base_uri, self.settings);
                builder.run()?;
                builder.into_parts()
            }
            Flavor::Xml => {
                let mut builder = XmlTreeBuilder::new(tokenizer, base_uri, self.settings);
                builder.run()?;
                builder.into_parts()
            }
        };
        if !errors.is_empty() {
            log::debug!(target: "thicket::parser", "{} parse errors recorded", errors.len());
        }
        self.errors = errors;
        Ok(tree)
    }

    /// Feed the tokens of `input` to `handler` without building a tree, and
    /// hand the handler back.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse_input`].
    pub fn stream<H: TokenHandler>(&mut self, input: &str, handler: H) -> Result<H, Fault> {
        let tokenizer = self.tokenizer(Cursor::new(input));
        let mut stream = TokenStream::new(tokenizer, self.flavor, handler);
        stream.run()?;
        let (mut tokenizer, handler) = stream.into_parts();
        self.errors = tokenizer.take_errors();
        Ok(handler)
    }

    /// Decode the character references in a plain string.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse_input`].
    pub fn unescape_entities(&mut self, input: &str, in_attribute: bool) -> Result<String, Fault> {
        let mut tokenizer = self.tokenizer(Cursor::new(input));
        let unescaped = tokenizer.unescape_entities(in_attribute)?;
        self.errors = tokenizer.take_errors();
        Ok(unescaped)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::html()
    }
}

/// Render a tree as an indented outline, one node per line.
///
/// The walk keeps its own stack, so arbitrarily deep trees print without
/// exhausting the thread's stack.
#[must_use]
pub fn print_tree(tree: &DomTree) -> String {
    let mut out = String::new();
    let mut pending = vec![(NodeId::ROOT, 0)];
    while let Some((id, depth)) = pending.pop() {
        print_node(tree, id, depth, &mut out);
        pending.extend(
            tree.children(id)
                .iter()
                .rev()
                .map(|&child| (child, depth + 1)),
        );
    }
    out
}

fn print_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(data) = tree.data(id) else {
        return;
    };
    let prefix = "  ".repeat(depth);
    let _ = match data {
        NodeData::Document { quirks_mode } => writeln!(out, "{prefix}#document ({quirks_mode:?})"),
        NodeData::Element(element) => {
            if element.attrs.is_empty() {
                writeln!(out, "{prefix}<{}>", element.tag_name)
            } else {
                writeln!(out, "{prefix}<{} {}>", element.tag_name, element.attrs)
            }
        }
        NodeData::Text(text) | NodeData::Data(text) => {
            writeln!(out, "{prefix}\"{}\"", text.replace('\n', "\\n"))
        }
        NodeData::CData(text) => writeln!(out, "{prefix}<![CDATA[{text}]]>"),
        NodeData::Comment(text) => writeln!(out, "{prefix}<!--{text}-->"),
        NodeData::DocumentType(doctype) => writeln!(out, "{prefix}<!DOCTYPE {}>", doctype.name),
        NodeData::XmlDeclaration(declaration) => {
            let (open, close) = if declaration.is_processing_instruction {
                ("?", "?")
            } else {
                ("!", "")
            };
            if declaration.attrs.is_empty() {
                writeln!(out, "{prefix}<{open}{}{close}>", declaration.name)
            } else {
                writeln!(
                    out,
                    "{prefix}<{open}{} {}{close}>",
                    declaration.name, declaration.attrs
                )
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_tree_outline() {
        let tree = Parser::html()
            .parse_input("<!DOCTYPE html><p class=a>x\ny", "")
            .expect("no fault");
        let outline = print_tree(&tree);
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "#document (NoQuirks)");
        assert_eq!(lines[1], "  <!DOCTYPE html>");
        assert_eq!(lines[2], "  <html>");
        assert_eq!(lines[3], "    <head>");
        assert_eq!(lines[4], "    <body>");
        assert!(lines[5].starts_with("      <p "));
        assert_eq!(lines[6], "        \"x\\ny\"");
    }

    #[test]
    fn test_print_tree_deep_document() {
        const DEPTH: usize = 5_000;
        let tree = Parser::xml()
            .parse_input(&"<a>".repeat(DEPTH), "")
            .expect("no fault");
        // A small stack so any per-level recursion would overflow.
        let outline = std::thread::scope(|scope| {
            std::thread::Builder::new()
                .stack_size(128 * 1024)
                .spawn_scoped(scope, || print_tree(&tree))
                .expect("spawn")
                .join()
                .expect("no overflow")
        });
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines.len(), DEPTH + 1);
        assert_eq!(lines[DEPTH], format!("{}<a>", "  ".repeat(DEPTH)));
    }

    #[test]
    fn test_track_errors_bounds_the_log() {
        let mut parser = Parser::html().track_errors(2);
        let _ = parser
            .parse_input("</x></y></z></w><p></q>", "")
            .expect("no fault");
        assert_eq!(parser.errors().len(), 2);

        let mut quiet = Parser::html();
        let _ = quiet.parse_input("</x></y>", "").expect("no fault");
        assert!(quiet.errors().is_empty());
    }

    #[test]
    fn test_unescape_entities() {
        let mut parser = Parser::html();
        assert_eq!(
            parser.unescape_entities("a &lt; b &amp c", false).expect("no fault"),
            "a < b & c"
        );
        assert_eq!(
            parser.unescape_entities("?x=1&amp=2", true).expect("no fault"),
            "?x=1&amp=2"
        );
    }
}
