//! XML-flavored tree construction.
//!
//! One implicit mode: start tags insert and push, end tags pop back to the
//! nearest open element of the same name, everything else becomes a leaf.
//! No elements are synthesized and names keep their case by default.

use thicket_common::{ParseErrorList, ParseSettings};
use thicket_dom::{DocumentTypeData, DomTree, NodeData, NodeId, XmlDeclarationData};

use super::tree_builder::{BuilderCore, TokenSink};
use crate::cursor::Cursor;
use crate::error::Fault;
use crate::tokenizer::{Characters, Comment, Doctype, Tag, Token, Tokenizer};

/// Builds a tree from XML-ish markup.
#[derive(Debug)]
pub struct XmlTreeBuilder {
    core: BuilderCore,
}

impl XmlTreeBuilder {
    /// Create a builder reading from `tokenizer`.
    #[must_use]
    pub fn new(tokenizer: Tokenizer, base_uri: &str, settings: ParseSettings) -> Self {
        let mut core = BuilderCore::new(tokenizer, base_uri, settings);
        core.stack.push(NodeId::ROOT);
        Self { core }
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.core.tree
    }

    /// Finish, handing over the tree and the recorded diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (DomTree, ParseErrorList) {
        self.core.finish()
    }

    fn insert_start_tag(&mut self, tag: &Tag) -> Result<(), Fault> {
        let element = self.core.element_for(tag);
        let id = self.core.append(NodeData::Element(element))?;
        if tag.self_closing {
            self.core.tokenizer.acknowledge_self_closing();
        } else {
            self.core.stack.push(id);
        }
        Ok(())
    }

    /// Close the nearest open element named like `tag`; ignored when none is open.
    fn close_element(&mut self, tag: &Tag) -> bool {
        let name = self.core.settings.normalize_tag(&tag.name).into_owned();
        if self.core.pop_to_close(&name) {
            true
        } else {
            log::trace!(target: "thicket::tree_builder", "ignoring unmatched end tag [{name}]");
            false
        }
    }

    fn insert_characters(&mut self, characters: &Characters) -> Result<(), Fault> {
        let data = if characters.cdata {
            NodeData::CData(characters.data.clone())
        } else {
            NodeData::Text(characters.data.clone())
        };
        self.core.append_leaf(data)
    }

    fn insert_comment(&mut self, comment: &Comment) -> Result<(), Fault> {
        let node = if comment.bogus
            && let Some(declaration) = self.declaration_from(&comment.data)?
        {
            NodeData::XmlDeclaration(declaration)
        } else {
            NodeData::Comment(comment.data.clone())
        };
        self.core.append_leaf(node)
    }

    /// Turn the body of a bogus comment such as `?xml version="1.0"?` or
    /// `!ENTITY name "value"` into a declaration.
    ///
    /// The body is run back through the tag states as `<body>` so the
    /// pseudo-attributes come out like ordinary attributes. Anything that does
    /// not tokenize to a start tag stays a comment.
    fn declaration_from(&mut self, data: &str) -> Result<Option<XmlDeclarationData>, Fault> {
        let is_processing_instruction = data.starts_with('?');
        if !is_processing_instruction && !data.starts_with('!') {
            return Ok(None);
        }
        let body = &data[1..];
        let body = if is_processing_instruction {
            body.strip_suffix('?').unwrap_or(body)
        } else {
            body
        };
        if body.is_empty() || body.starts_with(['!', '?']) {
            return Ok(None);
        }

        let errors = ParseErrorList::tracking(self.core.tokenizer.errors().max_size());
        let mut tokenizer = Tokenizer::with_errors(Cursor::new(format!("<{body}>")), errors);
        let token = tokenizer.read()?;
        let declaration = match &token {
            Token::StartTag(tag) if !tag.name.is_empty() => {
                let name = self.core.settings.normalize_tag(&tag.name).into_owned();
                let attrs = self.core.normalize_attributes(&tag.attributes);
                Some(XmlDeclarationData {
                    name,
                    is_processing_instruction,
                    attrs,
                })
            }
            _ => None,
        };
        tokenizer.recycle(token);
        for error in tokenizer.take_errors().iter() {
            self.core
                .error(format_args!("in declaration [{body}]: {}", error.message));
        }
        Ok(declaration)
    }

    /// Doctypes are kept verbatim and carry no quirks consequences here.
    ///
    /// A doctype always lands under the document, even when it appears
    /// inside an element.
    fn insert_doctype(&mut self, doctype: &Doctype) -> Result<(), Fault> {
        let data = DocumentTypeData {
            name: self
                .core
                .settings
                .normalize_tag(doctype.name.as_deref().unwrap_or_default())
                .into_owned(),
            pub_sys_key: doctype.pub_sys_key.map(|key| key.to_string()),
            public_id: doctype.public_identifier.clone().unwrap_or_default(),
            system_id: doctype.system_identifier.clone().unwrap_or_default(),
        };
        self.core
            .append_leaf_to(NodeId::ROOT, NodeData::DocumentType(data))
    }
}

impl TokenSink for XmlTreeBuilder {
    fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.core.tokenizer
    }

    fn process(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::StartTag(tag) => self.insert_start_tag(tag)?,
            Token::EndTag(tag) => return Ok(self.close_element(tag)),
            Token::Characters(characters) => self.insert_characters(characters)?,
            Token::Comment(comment) => self.insert_comment(comment)?,
            Token::Doctype(doctype) => self.insert_doctype(doctype)?,
            Token::EndOfInput => {}
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(input: &str) -> DomTree {
        let mut builder =
            XmlTreeBuilder::new(Tokenizer::new(input), "", ParseSettings::PRESERVE_CASE);
        builder.run().unwrap();
        builder.into_parts().0
    }

    #[test]
    fn test_declaration_from_processing_instruction() {
        let tree = build(r#"<?xml version="1.0" encoding="UTF-8"?><doc/>"#);
        let first = tree.children(NodeId::ROOT)[0];
        let Some(NodeData::XmlDeclaration(declaration)) = tree.data(first) else {
            panic!("expected a declaration, got {:?}", tree.data(first));
        };
        assert_eq!(declaration.name, "xml");
        assert!(declaration.is_processing_instruction);
        assert_eq!(declaration.attrs.get("version"), Some("1.0"));
        assert_eq!(declaration.attrs.get("encoding"), Some("UTF-8"));
    }

    #[test]
    fn test_declaration_errors_reach_the_builder_log() {
        let tokenizer = Tokenizer::with_errors(
            Cursor::new(r#"<?xml a="1" a="2"?><doc/>"#),
            ParseErrorList::tracking(16),
        );
        let mut builder = XmlTreeBuilder::new(tokenizer, "", ParseSettings::PRESERVE_CASE);
        builder.run().unwrap();
        let (tree, errors) = builder.into_parts();

        let first = tree.children(NodeId::ROOT)[0];
        let Some(NodeData::XmlDeclaration(declaration)) = tree.data(first) else {
            panic!("expected a declaration, got {:?}", tree.data(first));
        };
        assert_eq!(declaration.attrs.get("a"), Some("1"));
        assert!(
            errors
                .iter()
                .any(|error| error.message.contains("duplicate attribute [a]")),
            "{errors:?}"
        );
    }

    #[test]
    fn test_nested_doctype_goes_under_document() {
        let tree = build("<a><!DOCTYPE note></a>");
        let roots = tree.children(NodeId::ROOT);
        assert_eq!(roots.len(), 2);
        assert_eq!(tree.tag_name(roots[0]), Some("a"));
        assert!(tree.children(roots[0]).is_empty());
        let Some(NodeData::DocumentType(doctype)) = tree.data(roots[1]) else {
            panic!("expected a doctype, got {:?}", tree.data(roots[1]));
        };
        assert_eq!(doctype.name, "note");
    }

    #[test]
    fn test_bare_bang_stays_comment() {
        let tree = build("<!>");
        let first = tree.children(NodeId::ROOT)[0];
        assert_eq!(tree.data(first), Some(&NodeData::Comment("!".to_owned())));
    }
}
