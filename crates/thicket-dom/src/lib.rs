//! Document tree for the thicket parser.
//!
//! This crate provides an arena-based tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/) closely enough for the
//! tree builders to construct documents and for callers to walk them.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! Children are owned by their parent's child list; the parent link is a plain
//! index, so there are no ownership cycles. Each node caches its position in
//! its parent's child list, and every mutation reindexes the siblings it
//! disturbs before returning.

mod attributes;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use attributes::{Attribute, Attributes};

/// A type-safe index into the document tree.
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Misuse of the tree mutation primitives.
///
/// None of these can be caused by input markup; they mean the caller linked
/// nodes in a way the tree cannot represent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id does not belong to this tree.
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),
    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Parent that was expected to own the child.
        parent: NodeId,
        /// Node that was not found among its children.
        child: NodeId,
    },
    /// The insertion would make a node its own ancestor.
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle {
        /// Requested parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
    },
    /// The root is not allowed to move.
    #[error("the document root cannot be re-parented")]
    RootMoved,
    /// A child list and a parent link disagree.
    #[error("{child} is listed under {parent} but records parent {recorded:?}")]
    ParentMismatch {
        /// Node whose child list holds `child`.
        parent: NodeId,
        /// The inconsistent child.
        child: NodeId,
        /// Parent the child believes it has.
        recorded: Option<NodeId>,
    },
    /// A cached sibling index is stale.
    #[error("{node} has sibling index {recorded} but sits at position {actual}")]
    SiblingIndex {
        /// The node with the stale index.
        node: NodeId,
        /// Index stored on the node.
        recorded: usize,
        /// Index in its parent's child list.
        actual: usize,
    },
    /// A node is attached somewhere the root cannot reach, or twice.
    #[error("{0} is attached but not reachable exactly once from the root")]
    Unreachable(NodeId),
}

/// Document-wide rendering compatibility classification.
///
/// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
/// derives it from the DOCTYPE. The parser only records it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuirksMode {
    /// Standards mode.
    #[default]
    NoQuirks,
    /// Full quirks mode.
    Quirks,
    /// Almost-standards mode.
    LimitedQuirks,
}

/// Element-specific data.
///
/// NOTE: Only the local name and attributes are kept; namespaces are not
/// modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: Attributes,
}

impl ElementData {
    /// Create element data with no attributes.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Attributes::new(),
        }
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Returns the class names from the class attribute, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// `<!DOCTYPE name PUBLIC "public" "system">`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// Doctype name, e.g. `html`.
    pub name: String,
    /// `PUBLIC` or `SYSTEM` when a keyword was present.
    pub pub_sys_key: Option<String>,
    /// Public identifier, empty when absent.
    pub public_id: String,
    /// System identifier, empty when absent.
    pub system_id: String,
}

/// `<?xml version="1.0"?>` or `<!ENTITY ...>` style declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDeclarationData {
    /// Declaration name, e.g. `xml` or `ENTITY`.
    pub name: String,
    /// `true` for `<?...?>`, `false` for `<!...>`.
    pub is_processing_instruction: bool,
    /// Pseudo-attributes harvested from the declaration body.
    pub attrs: Attributes,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The single document root.
    Document {
        /// Classification set by the HTML tree builder.
        quirks_mode: QuirksMode,
    },
    /// An element.
    Element(ElementData),
    /// Character data.
    Text(String),
    /// A `<![CDATA[...]]>` section.
    CData(String),
    /// Raw content of `script` and `style` elements.
    Data(String),
    /// A comment.
    Comment(String),
    /// A document type declaration.
    DocumentType(DocumentTypeData),
    /// An XML declaration or processing instruction.
    XmlDeclaration(XmlDeclarationData),
}

impl NodeData {
    /// Shorthand for an element node with no attributes.
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self::Element(ElementData::new(tag_name))
    }

    /// Short lowercase label used by debug printers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Document { .. } => "document",
            Self::Element(_) => "element",
            Self::Text(_) => "text",
            Self::CData(_) => "cdata",
            Self::Data(_) => "data",
            Self::Comment(_) => "comment",
            Self::DocumentType(_) => "doctype",
            Self::XmlDeclaration(_) => "declaration",
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "An object that participates in a tree has a parent, which is either
/// null or an object, and has children, which is an ordered set of objects."
#[derive(Debug, Clone)]
pub struct Node {
    /// What this node is.
    pub data: NodeData,
    /// Parent link; `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Position in the parent's child list.
    pub sibling_index: usize,
    /// Base URI in effect when this node was created.
    pub base_uri: Arc<str>,
}

/// Arena-based document tree.
///
/// All nodes live in one vector and refer to each other by [`NodeId`]. Nodes
/// removed from the tree stay in the arena, detached.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    base_uri: Arc<str>,
}

impl DomTree {
    /// Create a new tree holding just the document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_uri("")
    }

    /// Create a new tree whose nodes record `base_uri`.
    #[must_use]
    pub fn with_base_uri(base_uri: &str) -> Self {
        let base_uri: Arc<str> = Arc::from(base_uri);
        let document = Node {
            data: NodeData::Document {
                quirks_mode: QuirksMode::NoQuirks,
            },
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
            base_uri: Arc::clone(&base_uri),
        };
        Self {
            nodes: vec![document],
            base_uri,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the document node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Base URI given to nodes allocated from now on.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Change the base URI for nodes allocated from now on.
    pub fn set_base_uri(&mut self, base_uri: &str) {
        self.base_uri = Arc::from(base_uri);
    }

    /// Allocate a new, detached node and return its ID.
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
            base_uri: Arc::clone(&self.base_uri),
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id.0).ok_or(TreeError::UnknownNode(id))
    }

    /// Refresh cached sibling indices of `parent`'s children from `start` on.
    fn reindex_children(&mut self, parent: NodeId, start: usize) {
        let count = self.nodes[parent.0].children.len();
        for index in start..count {
            let child = self.nodes[parent.0].children[index];
            self.nodes[child.0].sibling_index = index;
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let _ = self.node(parent)?;
        let _ = self.node(child)?;
        if child == NodeId::ROOT {
            return Err(TreeError::RootMoved);
        }
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(TreeError::Cycle { parent, child });
        }
        Ok(())
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// A node that already has a parent is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, child, None)
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A node that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.check_insertable(parent, child)?;
        if let Some(reference) = reference
            && self.node(reference)?.parent != Some(parent)
        {
            return Err(TreeError::NotAChild {
                parent,
                child: reference,
            });
        }
        if reference == Some(child) {
            return Ok(());
        }

        self.detach(child)?;

        let index = match reference {
            Some(reference) => self.nodes[reference.0].sibling_index,
            None => self.nodes[parent.0].children.len(),
        };
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.reindex_children(parent, index);
        Ok(())
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`. The node stays in the arena, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let node = self.node(child)?;
        if node.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        let index = node.sibling_index;
        let removed = self.node_mut(parent)?.children.remove(index);
        debug_assert_eq!(removed, child);

        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.sibling_index = 0;
        self.reindex_children(parent, index);
        Ok(())
    }

    /// Remove `child` from whatever parent it has. No-op for detached nodes.
    pub fn detach(&mut self, child: NodeId) -> Result<(), TreeError> {
        match self.node(child)?.parent {
            Some(parent) => self.remove_child(parent, child),
            None => Ok(()),
        }
    }

    /// Move every child of `from` to the end of `to`, keeping their order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), TreeError> {
        let _ = self.node(from)?;
        let _ = self.node(to)?;
        if from == to || self.is_descendant_of(to, from) {
            return Err(TreeError::Cycle {
                parent: to,
                child: from,
            });
        }

        let moved = std::mem::take(&mut self.nodes[from.0].children);
        let start = self.nodes[to.0].children.len();
        for &child in &moved {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(moved);
        self.reindex_children(to, start);
        Ok(())
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of a node among its siblings (0 for detached nodes).
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.sibling_index)
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        self.children(node.parent?)
            .get(node.sibling_index + 1)
            .copied()
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let index = node.sibling_index.checked_sub(1)?;
        self.children(node.parent?).get(index).copied()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate `id` and everything below it in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let stack = if self.get(id).is_some() { vec![id] } else { Vec::new() };
        DescendantIterator { tree: self, stack }
    }

    /// Get the node's data.
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(|n| &n.data)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id)?.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Tag name if this node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of all text, CDATA and data descendants in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            match self.data(node) {
                Some(NodeData::Text(s) | NodeData::CData(s) | NodeData::Data(s)) => {
                    out.push_str(s);
                }
                _ => {}
            }
        }
        out
    }

    /// Quirks mode recorded on the document node.
    #[must_use]
    pub fn quirks_mode(&self) -> QuirksMode {
        match self.data(NodeId::ROOT) {
            Some(NodeData::Document { quirks_mode }) => *quirks_mode,
            _ => QuirksMode::NoQuirks,
        }
    }

    /// Record the document's quirks mode.
    pub fn set_quirks_mode(&mut self, mode: QuirksMode) {
        if let Some(NodeData::Document { quirks_mode }) = self.nodes.get_mut(0).map(|n| &mut n.data)
        {
            *quirks_mode = mode;
        }
    }

    /// The first doctype child of the document.
    #[must_use]
    pub fn doctype(&self) -> Option<&DocumentTypeData> {
        self.children(NodeId::ROOT)
            .iter()
            .find_map(|&id| match self.data(id) {
                Some(NodeData::DocumentType(doctype)) => Some(doctype),
                _ => None,
            })
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// The first `head` child of the document element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.tag_name(id)
                    .is_some_and(|t| t.eq_ignore_ascii_case("head"))
            })
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.tag_name(id).is_some_and(|t| {
                    t.eq_ignore_ascii_case("body") || t.eq_ignore_ascii_case("frameset")
                })
            })
            .copied()
    }

    /// Check the structural invariants of the attached tree.
    ///
    /// Every node reachable from the root must be reached exactly once, its
    /// parent link must name the node whose child list holds it, and its
    /// cached sibling index must equal its position there.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.nodes[0].parent.is_some() {
            return Err(TreeError::RootMoved);
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![NodeId::ROOT];
        seen[0] = true;
        while let Some(parent) = stack.pop() {
            for (index, &child) in self.node(parent)?.children.iter().enumerate() {
                let node = self.node(child)?;
                if seen[child.0] {
                    return Err(TreeError::Unreachable(child));
                }
                seen[child.0] = true;
                if node.parent != Some(parent) {
                    return Err(TreeError::ParentMismatch {
                        parent,
                        child,
                        recorded: node.parent,
                    });
                }
                if node.sibling_index != index {
                    return Err(TreeError::SiblingIndex {
                        node: child,
                        recorded: node.sibling_index,
                        actual: index,
                    });
                }
                stack.push(child);
            }
        }
        // A node outside the attached tree may only hang off another detached node.
        for (index, node) in self.nodes.iter().enumerate() {
            let claims_attached_parent = node
                .parent
                .is_some_and(|parent| seen.get(parent.0).copied().unwrap_or(true));
            if !seen[index] && claims_attached_parent {
                return Err(TreeError::Unreachable(NodeId(index)));
            }
        }
        Ok(())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
