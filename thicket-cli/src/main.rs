//! Thicket CLI - HTML/XML parsing and debugging tool
//!
//! Usage:
//!   thicket <file>              Parse and display the document tree
//!   thicket <file> --json       Output the tree as JSON
//!   thicket <file> --tokens     Show the token stream instead of a tree
//!   thicket <file> --xml        Use the XML tree builder
//!   thicket --html '<p>Hi'      Parse a string directly

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use owo_colors::OwoColorize;
use serde::Serialize;
use thicket_common::{ParseErrorList, ParseSettings};
use thicket_dom::{DomTree, NodeData, NodeId};
use thicket_html::tokenizer::{Characters, Comment, Doctype, Tag};
use thicket_html::{Parser, Token, TokenHandler};

/// Thicket - forgiving HTML and XML parser
#[derive(ClapParser, Debug)]
#[command(name = "thicket")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a file
    thicket page.html

    # Parse inline markup and show diagnostics
    thicket --html '<table><tr><td>x</div>' --errors 20

    # Read from stdin as XML
    cat feed.xml | thicket - --xml --json
"#)]
struct Cli {
    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "MARKUP")]
    html: Option<String>,

    /// Build the tree with XML rules
    #[arg(long)]
    xml: bool,

    /// Print tokens instead of building a tree
    #[arg(short, long)]
    tokens: bool,

    /// Print the tree as JSON
    #[arg(short, long)]
    json: bool,

    /// Report up to this many parse errors
    #[arg(short, long, value_name = "N", default_value = "0")]
    errors: usize,

    /// Keep tag and attribute names as written
    #[arg(long)]
    preserve_case: bool,

    /// Log level: -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn parser(&self) -> Parser {
        let parser = if self.xml { Parser::xml() } else { Parser::html() };
        let parser = if self.preserve_case {
            parser.with_settings(ParseSettings::PRESERVE_CASE)
        } else {
            parser
        };
        parser.track_errors(self.errors)
    }

    fn input(&self) -> Result<String> {
        if let Some(markup) = &self.html {
            return Ok(markup.clone());
        }
        match &self.path {
            Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            Some(_) => {
                let mut input = String::new();
                let _ = io::stdin()
                    .read_to_string(&mut input)
                    .context("reading stdin")?;
                Ok(input)
            }
            None => anyhow::bail!("no input: pass a FILE, `-` for stdin, or --html"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = cli.input()?;
    let mut parser = cli.parser();
    log::debug!("parsing {} bytes as {:?}", input.len(), parser.flavor());

    if cli.tokens {
        let printer = parser.stream(&input, TokenPrinter::default())?;
        for (i, line) in printer.lines.iter().enumerate() {
            println!("{i:4}: {line}");
        }
    } else {
        let tree = parser.parse_input(&input, "")?;
        if cli.json {
            let json = serde_json::to_string_pretty(&JsonNode::list(&tree))?;
            println!("{json}");
        } else {
            print_tree(&tree);
        }
    }

    print_errors(parser.errors());
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn print_errors(errors: &ParseErrorList) {
    if errors.is_empty() {
        return;
    }
    eprintln!("{}", format!("=== Parse errors ({}) ===", errors.len()).bold());
    for error in errors.iter() {
        eprintln!("  {:>6}: {}", error.position.yellow(), error.message);
    }
}

// =============================================================================
// Tree output
// =============================================================================

/// Print the tree depth-first, walking with an explicit stack.
fn print_tree(tree: &DomTree) {
    let mut pending = vec![(NodeId::ROOT, 0)];
    while let Some((id, depth)) = pending.pop() {
        print_node(tree, id, depth);
        pending.extend(
            tree.children(id)
                .iter()
                .rev()
                .map(|&child| (child, depth + 1)),
        );
    }
}

fn print_node(tree: &DomTree, id: NodeId, depth: usize) {
    let Some(data) = tree.data(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match data {
        NodeData::Document { quirks_mode } => {
            println!("{indent}{} {}", "#document".bold(), format!("({quirks_mode:?})").dimmed());
        }
        NodeData::Element(element) => {
            let mut line = format!("{indent}<{}", element.tag_name.cyan());
            for attr in element.attrs.iter() {
                line.push_str(&format!(" {}={:?}", attr.name.yellow(), attr.value));
            }
            println!("{line}>");
        }
        NodeData::Text(text) | NodeData::Data(text) => {
            println!("{indent}{}", format!("{text:?}").green());
        }
        NodeData::CData(text) => println!("{indent}{}", format!("<![CDATA[{text}]]>").green()),
        NodeData::Comment(text) => println!("{indent}{}", format!("<!--{text}-->").dimmed()),
        NodeData::DocumentType(doctype) => {
            println!("{indent}{}", format!("<!DOCTYPE {}>", doctype.name).magenta());
        }
        NodeData::XmlDeclaration(declaration) => {
            let open = if declaration.is_processing_instruction { '?' } else { '!' };
            println!(
                "{indent}{}",
                format!("<{open}{} {}>", declaration.name, declaration.attrs).magenta()
            );
        }
    }
}

/// One node of the JSON output.
///
/// Nodes are listed in document order and point at their parent by index,
/// so deep documents serialize without nesting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode {
    id: usize,
    parent: Option<usize>,
    #[serde(flatten)]
    kind: JsonKind,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum JsonKind {
    Document {
        quirks_mode: String,
    },
    Element {
        tag_name: String,
        attributes: Vec<(String, String)>,
    },
    Text {
        content: String,
    },
    Cdata {
        content: String,
    },
    Comment {
        content: String,
    },
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Declaration {
        name: String,
        processing_instruction: bool,
        attributes: Vec<(String, String)>,
    },
}

impl JsonNode {
    fn list(tree: &DomTree) -> Vec<Self> {
        tree.descendants(NodeId::ROOT)
            .filter_map(|id| {
                let kind = JsonKind::from_data(tree.data(id)?);
                Some(Self {
                    id: id.0,
                    parent: tree.parent(id).map(|parent| parent.0),
                    kind,
                })
            })
            .collect()
    }
}

impl JsonKind {
    fn from_data(data: &NodeData) -> Self {
        match data {
            NodeData::Document { quirks_mode } => Self::Document {
                quirks_mode: format!("{quirks_mode:?}"),
            },
            NodeData::Element(element) => Self::Element {
                tag_name: element.tag_name.clone(),
                attributes: element
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.clone(), attr.value.clone()))
                    .collect(),
            },
            NodeData::Text(text) | NodeData::Data(text) => Self::Text {
                content: text.clone(),
            },
            NodeData::CData(text) => Self::Cdata {
                content: text.clone(),
            },
            NodeData::Comment(text) => Self::Comment {
                content: text.clone(),
            },
            NodeData::DocumentType(doctype) => Self::Doctype {
                name: doctype.name.clone(),
                public_id: doctype.public_id.clone(),
                system_id: doctype.system_id.clone(),
            },
            NodeData::XmlDeclaration(declaration) => Self::Declaration {
                name: declaration.name.clone(),
                processing_instruction: declaration.is_processing_instruction,
                attributes: declaration
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.clone(), attr.value.clone()))
                    .collect(),
            },
        }
    }
}

// =============================================================================
// Token output
// =============================================================================

/// Collects one display line per token.
#[derive(Debug, Default)]
struct TokenPrinter {
    lines: Vec<String>,
}

impl TokenPrinter {
    fn record(&mut self, token: &Token) {
        self.lines.push(token.to_string());
    }
}

impl TokenHandler for TokenPrinter {
    fn start_tag(&mut self, tag: &Tag) {
        self.record(&Token::StartTag(tag.clone()));
    }

    fn end_tag(&mut self, tag: &Tag) {
        self.record(&Token::EndTag(tag.clone()));
    }

    fn text(&mut self, text: &Characters) {
        self.record(&Token::Characters(text.clone()));
    }

    fn comment(&mut self, comment: &Comment) {
        self.record(&Token::Comment(comment.clone()));
    }

    fn doctype(&mut self, doctype: &Doctype) {
        self.lines.push(doctype.to_string());
    }

    fn end_of_input(&mut self) {
        self.record(&Token::EndOfInput);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_nodes_stay_flat_for_deep_documents() {
        const DEPTH: usize = 10_000;
        let tree = Parser::xml()
            .parse_input(&"<a>".repeat(DEPTH), "")
            .expect("no fault");
        let nodes = JsonNode::list(&tree);
        assert_eq!(nodes.len(), DEPTH + 1);
        assert_eq!(nodes[0].parent, None);
        assert_eq!(nodes[DEPTH].parent, Some(nodes[DEPTH - 1].id));

        let json = serde_json::to_string(&nodes).expect("serializes");
        let root = r#"[{"id":0,"parent":null,"type":"document","quirksMode":"NoQuirks"}"#;
        assert!(json.starts_with(root));
        assert!(json.contains(r#""parent":0,"type":"element","tagName":"a","attributes":[]}"#));
    }
}
