//! Pieces shared by every token consumer.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A consumer implements [`TokenSink`]; the default [`TokenSink::run`] loop
//! pulls tokens, hands each to [`TokenSink::process`], returns it to the
//! tokenizer and stops after the end-of-input token. [`BuilderCore`] holds
//! the state both tree builders need: the tokenizer, the tree, the stack of
//! open elements and the case-folding settings.

use std::fmt;

use thicket_common::{ParseErrorList, ParseSettings};
use thicket_dom::{Attribute, Attributes, DomTree, ElementData, NodeData, NodeId};

use crate::error::Fault;
use crate::tokenizer::{Tag, Token, Tokenizer};

/// A consumer of tokens.
pub trait TokenSink {
    /// The tokenizer feeding this sink.
    fn tokenizer_mut(&mut self) -> &mut Tokenizer;

    /// Apply one token. Returns `false` when the token was ignored.
    fn process(&mut self, token: &Token) -> Result<bool, Fault>;

    /// Drive the tokenizer to the end of input.
    fn run(&mut self) -> Result<(), Fault> {
        loop {
            let token = self.tokenizer_mut().read()?;
            let done = token.is_eof();
            if !self.process(&token)? {
                log::trace!(target: "thicket::tree_builder", "ignored {token}");
            }
            self.tokenizer_mut().recycle(token);
            if done {
                return Ok(());
            }
        }
    }
}

/// State shared by the XML and HTML tree builders.
#[derive(Debug)]
pub struct BuilderCore {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) tree: DomTree,
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(crate) stack: Vec<NodeId>,
    pub(crate) settings: ParseSettings,
}

impl BuilderCore {
    pub(crate) fn new(tokenizer: Tokenizer, base_uri: &str, settings: ParseSettings) -> Self {
        Self {
            tokenizer,
            tree: DomTree::with_base_uri(base_uri),
            stack: Vec::new(),
            settings,
        }
    }

    /// Hand over the finished tree and the diagnostics.
    pub(crate) fn finish(mut self) -> (DomTree, ParseErrorList) {
        let errors = self.tokenizer.take_errors();
        (self.tree, errors)
    }

    /// Record a tree construction diagnostic.
    pub(crate) fn error(&mut self, message: impl fmt::Display) {
        if self.tokenizer.errors().can_add_error() {
            log::debug!(target: "thicket::tree_builder", "{message}");
            self.tokenizer.report(message);
        }
    }

    /// "The current node is the bottommost node in this stack of open elements."
    ///
    /// The document when the stack is empty.
    pub(crate) fn current_node(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Pop the current node.
    pub(crate) fn pop(&mut self) -> Result<NodeId, Fault> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    /// Whether `id` is an element called `name`, ignoring ASCII case.
    pub(crate) fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.tree
            .tag_name(id)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    /// Whether `id` is an element whose name is in `names`.
    pub(crate) fn is_named_any(&self, id: NodeId, names: &[&str]) -> bool {
        self.tree
            .tag_name(id)
            .is_some_and(|tag| names.iter().any(|name| tag.eq_ignore_ascii_case(name)))
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token." Names are folded per the settings and
    /// attributes whose folded names collide keep the first occurrence.
    pub(crate) fn element_for(&mut self, tag: &Tag) -> ElementData {
        let mut element = ElementData::new(self.settings.normalize_tag(&tag.name));
        element.attrs = self.normalize_attributes(&tag.attributes);
        element
    }

    /// Fold attribute names and drop duplicates created by folding.
    pub(crate) fn normalize_attributes(&mut self, source: &Attributes) -> Attributes {
        let mut attrs = Attributes::new();
        for attribute in source {
            let name = self.settings.normalize_attribute(&attribute.name);
            if name.is_empty() {
                continue;
            }
            if attrs.contains(&name) {
                self.error(format_args!("dropped duplicate attribute [{name}]"));
                continue;
            }
            attrs.push(Attribute::new(name, attribute.value.clone()));
        }
        attrs
    }

    /// Allocate `data` and insert it under `parent`, before `before` if given.
    pub(crate) fn insert_at(
        &mut self,
        parent: NodeId,
        before: Option<NodeId>,
        data: NodeData,
    ) -> Result<NodeId, Fault> {
        let id = self.tree.alloc(data);
        self.tree.insert_before(parent, id, before)?;
        Ok(id)
    }

    /// Allocate `data` as the last child of the current node.
    pub(crate) fn append(&mut self, data: NodeData) -> Result<NodeId, Fault> {
        let parent = self.current_node();
        self.insert_at(parent, None, data)
    }

    /// Append a node nothing will be inserted under as the last child of `parent`.
    pub(crate) fn append_leaf_to(&mut self, parent: NodeId, data: NodeData) -> Result<(), Fault> {
        let id = self.tree.alloc(data);
        self.tree.insert_before(parent, id, None)?;
        Ok(())
    }

    /// Append a leaf under the current node.
    pub(crate) fn append_leaf(&mut self, data: NodeData) -> Result<(), Fault> {
        self.append_leaf_to(self.current_node(), data)
    }

    /// Pop up to and including the topmost element called `name`.
    ///
    /// Returns `false` and leaves the stack alone when no such element is open.
    pub(crate) fn pop_to_close(&mut self, name: &str) -> bool {
        let Some(position) = self.stack.iter().rposition(|&id| {
            self.tree.tag_name(id) == Some(name)
        }) else {
            return false;
        };
        self.stack.truncate(position);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(input: &str, settings: ParseSettings) -> BuilderCore {
        let tokenizer = Tokenizer::with_errors(
            crate::cursor::Cursor::new(input),
            ParseErrorList::tracking(10),
        );
        BuilderCore::new(tokenizer, "https://example.com/", settings)
    }

    #[test]
    fn test_element_for_folds_and_dedups() {
        let mut builder = core("", ParseSettings::HTML_DEFAULT);
        let mut tag = Tag::named("DIV");
        tag.attributes.push(Attribute::new("ID", "a"));
        tag.attributes.push(Attribute::new("id", "b"));
        let element = builder.element_for(&tag);
        assert_eq!(element.tag_name, "div");
        assert_eq!(element.attrs.len(), 1);
        assert_eq!(element.attrs.get("id"), Some("a"));
        assert_eq!(builder.tokenizer.errors().len(), 1);
    }

    #[test]
    fn test_element_for_preserves_case() {
        let mut builder = core("", ParseSettings::PRESERVE_CASE);
        let mut tag = Tag::named("Feed");
        tag.attributes.push(Attribute::new("xmlns:Atom", "x"));
        let element = builder.element_for(&tag);
        assert_eq!(element.tag_name, "Feed");
        assert_eq!(element.attrs.get("xmlns:Atom"), Some("x"));
    }

    #[test]
    fn test_pop_to_close() {
        let mut builder = core("", ParseSettings::PRESERVE_CASE);
        let a = builder.append(NodeData::element("a")).unwrap();
        builder.stack.push(a);
        let b = builder.insert_at(a, None, NodeData::element("b")).unwrap();
        builder.stack.push(b);
        assert!(!builder.pop_to_close("c"));
        assert_eq!(builder.stack.len(), 2);
        assert!(builder.pop_to_close("a"));
        assert!(builder.stack.is_empty());
        assert_eq!(builder.current_node(), NodeId::ROOT);
        assert_eq!(builder.pop(), Err(Fault::StackUnderflow));
    }
}
