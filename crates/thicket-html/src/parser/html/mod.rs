//! HTML-flavored tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! Each insertion mode is one handler in a table keyed by [`InsertionMode`].
//! Handlers share the insertion primitives, scope checks and list
//! bookkeeping defined here. Template contents and foreign (SVG/MathML)
//! content are parsed as ordinary elements.

mod adoption;
mod in_body;
mod in_table;
mod modes;
mod quirks;

use std::mem;

use strum_macros::Display;
use thicket_common::{ParseErrorList, ParseSettings};
use thicket_dom::{DomTree, NodeData, NodeId};

use super::tree_builder::{BuilderCore, TokenSink};
use crate::error::Fault;
use crate::tag::TextContent;
use crate::tokenizer::{Characters, Tag, Token, Tokenizer};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

type ModeHandler = fn(&mut HtmlTreeBuilder, &Token) -> Result<bool, Fault>;

impl InsertionMode {
    /// The rules for this mode.
    fn handler(self) -> ModeHandler {
        match self {
            Self::Initial => HtmlTreeBuilder::handle_initial_mode,
            Self::BeforeHtml => HtmlTreeBuilder::handle_before_html_mode,
            Self::BeforeHead => HtmlTreeBuilder::handle_before_head_mode,
            Self::InHead => HtmlTreeBuilder::handle_in_head_mode,
            Self::InHeadNoscript => HtmlTreeBuilder::handle_in_head_noscript_mode,
            Self::AfterHead => HtmlTreeBuilder::handle_after_head_mode,
            Self::InBody => HtmlTreeBuilder::handle_in_body_mode,
            Self::Text => HtmlTreeBuilder::handle_text_mode,

            // ===== TABLE MODES =====
            Self::InTable => HtmlTreeBuilder::handle_in_table_mode,
            Self::InTableText => HtmlTreeBuilder::handle_in_table_text_mode,
            Self::InCaption => HtmlTreeBuilder::handle_in_caption_mode,
            Self::InColumnGroup => HtmlTreeBuilder::handle_in_column_group_mode,
            Self::InTableBody => HtmlTreeBuilder::handle_in_table_body_mode,
            Self::InRow => HtmlTreeBuilder::handle_in_row_mode,
            Self::InCell => HtmlTreeBuilder::handle_in_cell_mode,

            // ===== SELECT MODES =====
            Self::InSelect => HtmlTreeBuilder::handle_in_select_mode,
            Self::InSelectInTable => HtmlTreeBuilder::handle_in_select_in_table_mode,

            // ===== AFTER BODY / FRAMESET MODES =====
            Self::AfterBody => HtmlTreeBuilder::handle_after_body_mode,
            Self::InFrameset => HtmlTreeBuilder::handle_in_frameset_mode,
            Self::AfterFrameset => HtmlTreeBuilder::handle_after_frameset_mode,
            Self::AfterAfterBody => HtmlTreeBuilder::handle_after_after_body_mode,
            Self::AfterAfterFrameset => HtmlTreeBuilder::handle_after_after_frameset_mode,
        }
    }
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list contains elements in the formatting category, and markers."
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormattingEntry {
    /// A formatting element and the start tag it was created from, kept so
    /// the element can be recreated.
    Element { node: NodeId, tag: Tag },
    /// "Markers are inserted when entering applet, object, marquee, template,
    /// td, th, and caption elements."
    Marker,
}

impl FormattingEntry {
    const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Element { node, .. } => Some(*node),
            Self::Marker => None,
        }
    }
}

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Default,
    ListItem,
    Button,
    Table,
    Select,
}

/// "applet, caption, html, table, td, th, marquee, object, template"
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

impl Scope {
    fn is_boundary(self, name: &str) -> bool {
        match self {
            Self::Default => name_in(name, DEFAULT_SCOPE),
            Self::ListItem => name_in(name, DEFAULT_SCOPE) || name_in(name, &["ol", "ul"]),
            Self::Button => name_in(name, DEFAULT_SCOPE) || name.eq_ignore_ascii_case("button"),
            Self::Table => name_in(name, &["html", "table", "template"]),
            // "...all element types except optgroup and option."
            Self::Select => !name_in(name, &["optgroup", "option"]),
        }
    }
}

/// [§ 13.2.6.2 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules."
const SPECIAL_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound",
    "blockquote", "body", "br", "button", "caption", "center", "col", "colgroup", "dd",
    "details", "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup",
    "hr", "html", "iframe", "img", "input", "keygen", "li", "link", "listing", "main",
    "marquee", "menu", "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "p",
    "param", "plaintext", "pre", "script", "search", "section", "select", "source", "style",
    "summary", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "title",
    "tr", "track", "ul", "wbr", "xmp",
];

/// Whether `name` is one of `names`, ignoring ASCII case.
fn name_in(name: &str, names: &[&str]) -> bool {
    names.iter().any(|candidate| name.eq_ignore_ascii_case(candidate))
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Split a character run into its leading whitespace and the rest.
fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let rest = text.trim_start_matches(is_whitespace);
    text.split_at(text.len() - rest.len())
}

/// A synthesized character token carrying `data`.
fn characters(data: &str) -> Token {
    Token::Characters(Characters {
        data: data.to_owned(),
        cdata: false,
    })
}

/// Builds an HTML document tree, synthesizing missing structure and
/// recovering from misnested markup.
#[derive(Debug)]
pub struct HtmlTreeBuilder {
    core: BuilderCore,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    mode: InsertionMode,

    /// [§ 13.2.4.1 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// Where the text and in table text modes return to.
    original_mode: InsertionMode,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#head-element-pointer)
    head: Option<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    form: Option<NodeId>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    formatting: Vec<FormattingEntry>,

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    ///
    /// "The pending table character tokens list", already coalesced.
    pending_table_text: String,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    frameset_ok: bool,

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    foster_parenting: bool,

    /// "If the next token is a U+000A LINE FEED (LF) character token, then
    /// ignore that token and move on to the next one."
    skip_leading_newline: bool,

    /// Only the first `<base href>` counts.
    base_uri_set: bool,
}

impl HtmlTreeBuilder {
    /// Create a builder reading from `tokenizer`.
    #[must_use]
    pub fn new(tokenizer: Tokenizer, base_uri: &str, settings: ParseSettings) -> Self {
        Self {
            core: BuilderCore::new(tokenizer, base_uri, settings),
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            head: None,
            form: None,
            formatting: Vec::new(),
            pending_table_text: String::new(),
            frameset_ok: true,
            foster_parenting: false,
            skip_leading_newline: false,
            base_uri_set: false,
        }
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn mode(&self) -> InsertionMode {
        self.mode
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

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn dispatch(&mut self, token: &Token) -> Result<bool, Fault> {
        let handler = self.mode.handler();
        handler(self, token)
    }

    /// "Reprocess the token" in `mode`.
    fn reprocess(&mut self, mode: InsertionMode, token: &Token) -> Result<bool, Fault> {
        self.switch_to(mode);
        self.dispatch(token)
    }

    /// "Process the token using the rules for" `mode`, without switching.
    fn process_using(&mut self, mode: InsertionMode, token: &Token) -> Result<bool, Fault> {
        let handler = mode.handler();
        handler(self, token)
    }

    fn switch_to(&mut self, mode: InsertionMode) {
        if self.mode != mode {
            log::trace!(target: "thicket::tree_builder", "{} -> {mode}", self.mode);
        }
        self.mode = mode;
    }

    /// Record a diagnostic and report the token as ignored.
    fn ignore(&mut self, token: &Token) -> Result<bool, Fault> {
        self.core
            .error(format_args!("unexpected token [{token}] in insertion mode [{}]", self.mode));
        Ok(false)
    }

    fn parse_error(&mut self, token: &Token) {
        self.core
            .error(format_args!("unexpected token [{token}] in insertion mode [{}]", self.mode));
    }

    // =====================================================================
    // Stack of open elements
    // =====================================================================

    fn current_node(&self) -> NodeId {
        self.core.current_node()
    }

    fn current_is(&self, name: &str) -> bool {
        self.core.is_named(self.current_node(), name)
    }

    fn current_is_any(&self, names: &[&str]) -> bool {
        self.core.is_named_any(self.current_node(), names)
    }

    fn on_stack(&self, node: NodeId) -> bool {
        self.core.stack.contains(&node)
    }

    fn stack_has_named(&self, name: &str) -> bool {
        self.core.stack.iter().any(|&id| self.core.is_named(id, name))
    }

    fn remove_from_stack(&mut self, node: NodeId) {
        self.core.stack.retain(|&id| id != node);
    }

    /// Pop elements until one named `name` has been popped.
    fn pop_until(&mut self, name: &str) -> Result<(), Fault> {
        self.pop_until_any(&[name])
    }

    /// Pop elements until one named in `names` has been popped.
    fn pop_until_any(&mut self, names: &[&str]) -> Result<(), Fault> {
        while !self.core.stack.is_empty() {
            let popped = self.core.pop()?;
            if self.core.is_named_any(popped, names) {
                break;
            }
        }
        Ok(())
    }

    /// Pop elements until `node` has been popped.
    fn pop_until_node(&mut self, node: NodeId) -> Result<(), Fault> {
        while !self.core.stack.is_empty() {
            if self.core.pop()? == node {
                break;
            }
        }
        Ok(())
    }

    /// Pop the current node if it is named `name`.
    fn pop_if_current(&mut self, name: &str) -> Result<(), Fault> {
        if self.current_is(name) {
            let _ = self.core.pop()?;
        }
        Ok(())
    }

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node of
    ///          the stack)."
    ///
    /// STEP 2: "If node is the target node, terminate in a match state."
    ///
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    ///
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn in_scope_of(&self, targets: &[&str], scope: Scope) -> bool {
        for &id in self.core.stack.iter().rev() {
            let Some(name) = self.core.tree.tag_name(id) else {
                continue;
            };
            if name_in(name, targets) {
                return true;
            }
            if scope.is_boundary(name) {
                return false;
            }
        }
        false
    }

    fn in_scope(&self, name: &str) -> bool {
        self.in_scope_of(&[name], Scope::Default)
    }

    fn in_button_scope(&self, name: &str) -> bool {
        self.in_scope_of(&[name], Scope::Button)
    }

    fn in_list_item_scope(&self, name: &str) -> bool {
        self.in_scope_of(&[name], Scope::ListItem)
    }

    fn in_table_scope(&self, name: &str) -> bool {
        self.in_scope_of(&[name], Scope::Table)
    }

    fn in_select_scope(&self, name: &str) -> bool {
        self.in_scope_of(&[name], Scope::Select)
    }

    /// Scope check for one particular element rather than a tag name.
    fn node_in_scope(&self, node: NodeId) -> bool {
        for &id in self.core.stack.iter().rev() {
            if id == node {
                return true;
            }
            if let Some(name) = self.core.tree.tag_name(id)
                && Scope::Default.is_boundary(name)
            {
                return false;
            }
        }
        false
    }

    /// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "If a step requires the user agent to generate implied end tags but lists
    /// an element to exclude from the process, then the user agent must perform
    /// the above steps as if that element was not in the above list."
    fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) -> Result<(), Fault> {
        while self.current_is_any(IMPLIED_END_TAGS)
            && !exclude.is_some_and(|name| self.current_is(name))
        {
            let _ = self.core.pop()?;
        }
        Ok(())
    }

    fn generate_implied_end_tags(&mut self) -> Result<(), Fault> {
        self.generate_implied_end_tags_excluding(None)
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must generate implied end tags, except for p
    /// elements. If the current node is not a p element, then this is a parse
    /// error. Pop elements from the stack of open elements until a p element
    /// has been popped from the stack."
    fn close_p_element(&mut self) -> Result<(), Fault> {
        self.generate_implied_end_tags_excluding(Some("p"))?;
        if !self.current_is("p") {
            self.core.error("closing p element with other elements open");
        }
        self.pop_until("p")
    }

    /// Close a `p` in button scope, the preamble of most block start tags.
    fn close_p_in_button_scope(&mut self) -> Result<(), Fault> {
        if self.in_button_scope("p") {
            self.close_p_element()?;
        }
        Ok(())
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    fn reset_insertion_mode(&mut self) {
        let mode = self.appropriate_mode();
        self.switch_to(mode);
    }

    /// The mode the reset algorithm picks for the current stack.
    fn appropriate_mode(&self) -> InsertionMode {
        // STEP 1-2: "Let last be false. Let node be the last node in the stack
        //            of open elements."
        for (index, &node) in self.core.stack.iter().enumerate().rev() {
            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true."
            let last = index == 0;
            let Some(name) = self.core.tree.tag_name(node) else {
                continue;
            };
            let name = name.to_ascii_lowercase();
            return match name.as_str() {
                // STEP 4: "If node is a select element, run these substeps..."
                "select" => {
                    let in_table = !last
                        && self.core.stack[..index]
                            .iter()
                            .rev()
                            .take_while(|&&ancestor| !self.core.is_named(ancestor, "template"))
                            .any(|&ancestor| self.core.is_named(ancestor, "table"));
                    if in_table {
                        InsertionMode::InSelectInTable
                    } else {
                        InsertionMode::InSelect
                    }
                }
                "td" | "th" if !last => InsertionMode::InCell,
                "tr" => InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => InsertionMode::InTableBody,
                "caption" => InsertionMode::InCaption,
                "colgroup" => InsertionMode::InColumnGroup,
                "table" => InsertionMode::InTable,
                "head" if !last => InsertionMode::InHead,
                "body" => InsertionMode::InBody,
                "frameset" => InsertionMode::InFrameset,
                "html" => {
                    if self.head.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    }
                }
                // STEP 16: "If last is true, then switch the insertion mode to
                //           "in body" and return."
                _ if last => InsertionMode::InBody,
                _ => continue,
            };
        }
        InsertionMode::InBody
    }

    // =====================================================================
    // Creating and inserting nodes
    // =====================================================================

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target."
    ///
    /// Returns `(parent, before)`; `before` is `Some` when the node goes in
    /// front of an existing child.
    fn appropriate_place(&self, override_target: Option<NodeId>) -> (NodeId, Option<NodeId>) {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the current node."
        let target = override_target.unwrap_or_else(|| self.current_node());

        // STEP 2: "If foster parenting is enabled and target is a table, tbody,
        //          tfoot, thead, or tr element..."
        if self.foster_parenting
            && self
                .core
                .is_named_any(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            return self.foster_parent_location();
        }
        (target, None)
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    fn foster_parent_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 2.1: "Let last table be the last table element in the stack of
        //            open elements, if any."
        let Some(position) = self
            .core
            .stack
            .iter()
            .rposition(|&id| self.core.is_named(id, "table"))
        else {
            // STEP 2.3: "If there is no last table, then let adjusted insertion
            //            location be inside the first element in the stack of
            //            open elements (the html element)."
            return (self.core.stack.first().copied().unwrap_or(NodeId::ROOT), None);
        };
        let table = self.core.stack[position];

        // STEP 2.4: "If last table has a parent node, then let adjusted
        //            insertion location be inside last table's parent node,
        //            immediately before last table."
        if let Some(parent) = self.core.tree.parent(table) {
            return (parent, Some(table));
        }

        // STEP 2.5-2.6: "Let previous element be the element immediately above
        //                last table in the stack of open elements. Let adjusted
        //                insertion location be inside previous element, after
        //                its last child (if any)."
        let previous = position
            .checked_sub(1)
            .map_or(NodeId::ROOT, |above| self.core.stack[above]);
        (previous, None)
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Create an element for `tag`, insert it at the appropriate place and
    /// push it onto the stack of open elements.
    fn insert_element(&mut self, tag: &Tag) -> Result<NodeId, Fault> {
        let element = self.core.element_for(tag);
        let (parent, before) = self.appropriate_place(None);
        let id = self.core.insert_at(parent, before, NodeData::Element(element))?;
        self.core.stack.push(id);
        Ok(id)
    }

    /// Insert an element for a synthesized start tag named `name`.
    fn insert_implied(&mut self, name: &str) -> Result<NodeId, Fault> {
        self.insert_element(&Tag::named(name))
    }

    /// Insert a void element: "Immediately pop the current node off the stack
    /// of open elements. Acknowledge the token's self-closing flag, if it is set."
    fn insert_void(&mut self, tag: &Tag) -> Result<NodeId, Fault> {
        let id = self.insert_element(tag)?;
        let _ = self.core.pop()?;
        if tag.self_closing {
            self.core.tokenizer.acknowledge_self_closing();
        }
        Ok(id)
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// The generic raw text and RCDATA element parsing algorithms.
    fn insert_text_element(&mut self, tag: &Tag, kind: TextContent) -> Result<(), Fault> {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_element(tag)?;
        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the RAWTEXT
        //          state; otherwise ... switch the tokenizer to the RCDATA state."
        self.core.tokenizer.enter_text_content(kind);
        // STEP 3-4: "Set the original insertion mode to the current insertion
        //            mode. Then, switch the insertion mode to "text"."
        self.original_mode = self.mode;
        self.switch_to(InsertionMode::Text);
        Ok(())
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    ///
    /// Content of `script` and `style` becomes a data node.
    fn insert_text(&mut self, text: &str) -> Result<(), Fault> {
        if text.is_empty() {
            return Ok(());
        }
        let (parent, before) = self.appropriate_place(None);
        // "If the adjusted insertion location is in a Document node, then
        //  return." The DOM will not let Document nodes have Text node children.
        if parent == NodeId::ROOT {
            return Ok(());
        }

        let previous = match before {
            Some(reference) => self.core.tree.prev_sibling(reference),
            None => self.core.tree.last_child(parent),
        };
        if let Some(previous) = previous
            && let Some(node) = self.core.tree.get_mut(previous)
            && let NodeData::Text(data) | NodeData::Data(data) = &mut node.data
        {
            data.push_str(text);
            return Ok(());
        }

        let data = if self.core.is_named_any(parent, &["script", "style"]) {
            NodeData::Data(text.to_owned())
        } else {
            NodeData::Text(text.to_owned())
        };
        let _ = self.core.insert_at(parent, before, data)?;
        Ok(())
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str) -> Result<(), Fault> {
        let (parent, before) = self.appropriate_place(None);
        let _ = self
            .core
            .insert_at(parent, before, NodeData::Comment(data.to_owned()))?;
        Ok(())
    }

    /// Insert a comment as the last child of `parent`.
    fn insert_comment_in(&mut self, parent: NodeId, data: &str) -> Result<(), Fault> {
        let _ = self
            .core
            .insert_at(parent, None, NodeData::Comment(data.to_owned()))?;
        Ok(())
    }

    /// "For each attribute on the token, check to see if the attribute is
    /// already present on the top element of the stack of open elements. If
    /// it is not, add the attribute and its corresponding value to that element."
    fn merge_attributes(&mut self, target: NodeId, tag: &Tag) {
        let attrs = self.core.normalize_attributes(&tag.attributes);
        if let Some(element) = self.core.tree.as_element_mut(target) {
            for attribute in &attrs {
                if !element.attrs.contains(&attribute.name) {
                    element.attrs.push(attribute.clone());
                }
            }
        }
    }

    /// Record the first `<base href>` as the base URI for later nodes.
    fn apply_base_href(&mut self, tag: &Tag) {
        if self.base_uri_set {
            return;
        }
        if let Some(href) = tag.attributes.get_ignore_case("href")
            && !href.is_empty()
        {
            let href = href.trim().to_owned();
            log::debug!(target: "thicket::tree_builder", "base URI set to {href}");
            self.core.tree.set_base_uri(&href);
            self.base_uri_set = true;
        }
    }

    // =====================================================================
    // The list of active formatting elements
    // =====================================================================

    fn formatting_index_of(&self, node: NodeId) -> Option<usize> {
        self.formatting.iter().position(|entry| entry.node() == Some(node))
    }

    /// The last element named `name` after the last marker, if any.
    fn formatting_element_named(&self, name: &str) -> Option<(usize, NodeId)> {
        for (index, entry) in self.formatting.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { node, tag } => {
                    if tag.normal_name().eq_ignore_ascii_case(name) {
                        return Some((index, *node));
                    }
                }
            }
        }
        None
    }

    /// [§ 13.2.4.3 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    fn push_formatting_element(&mut self, node: NodeId, tag: &Tag) {
        // STEP 1: "If there are already three elements in the list of active
        //          formatting elements after the last marker, if any, or
        //          anywhere in the list if there are no markers, that have the
        //          same tag name, namespace, and attributes as element, then
        //          remove the earliest such element from the list of active
        //          formatting elements."
        //
        // This is the Noah's Ark clause.
        let mut matching = 0;
        let mut earliest = None;
        for (index, entry) in self.formatting.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element { tag: other, .. } => {
                    if other.normal_name() == tag.normal_name()
                        && same_attributes(other, tag)
                    {
                        matching += 1;
                        earliest = Some(index);
                    }
                }
            }
        }
        if matching >= 3
            && let Some(index) = earliest
        {
            let _ = self.formatting.remove(index);
        }

        // STEP 2: "Add element to the list of active formatting elements."
        self.formatting.push(FormattingEntry::Element {
            node,
            tag: tag.clone(),
        });
    }

    fn push_marker(&mut self) {
        self.formatting.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.3 Clear the list of active formatting elements up to the last marker](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    fn clear_formatting_to_last_marker(&mut self) {
        while let Some(entry) = self.formatting.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    fn reconstruct_formatting(&mut self) -> Result<(), Fault> {
        // STEP 1-2: "If there are no entries in the list of active formatting
        //            elements, then there is nothing to reconstruct... If the
        //            last entry is a marker, or if it is an element that is in
        //            the stack of open elements, then there is nothing to
        //            reconstruct."
        let Some(last) = self.formatting.last() else {
            return Ok(());
        };
        match last.node() {
            None => return Ok(()),
            Some(node) if self.on_stack(node) => return Ok(()),
            Some(_) => {}
        }

        // STEP 3-6: Rewind to the entry after the last marker or open element.
        let mut index = self.formatting.len() - 1;
        while index > 0 {
            let previous = &self.formatting[index - 1];
            match previous.node() {
                None => break,
                Some(node) if self.on_stack(node) => break,
                Some(_) => index -= 1,
            }
        }

        // STEP 7-10: "Create: Insert an HTML element for the token for which
        //             the element entry was created, to obtain new element.
        //             Replace the entry for entry in the list with an entry for
        //             new element. If the entry for new element in the list of
        //             active formatting elements is not the last entry in the
        //             list, return to the step labeled advance."
        while index < self.formatting.len() {
            let tag = match &self.formatting[index] {
                FormattingEntry::Element { tag, .. } => tag.clone(),
                FormattingEntry::Marker => {
                    return Err(Fault::Unreachable("marker inside reconstructed range"));
                }
            };
            let node = self.insert_element(&tag)?;
            self.formatting[index] = FormattingEntry::Element { node, tag };
            index += 1;
        }
        Ok(())
    }

    // =====================================================================
    // Character runs
    // =====================================================================

    /// Handle the leading whitespace of `text` with `on_whitespace` and hand
    /// the rest, if any, to `otherwise`.
    fn split_characters(
        &mut self,
        text: &Characters,
        on_whitespace: impl FnOnce(&mut Self, &str) -> Result<(), Fault>,
        otherwise: impl FnOnce(&mut Self, &Token) -> Result<bool, Fault>,
    ) -> Result<bool, Fault> {
        let (whitespace, rest) = split_leading_whitespace(&text.data);
        if !whitespace.is_empty() {
            on_whitespace(self, whitespace)?;
        }
        if rest.is_empty() {
            return Ok(true);
        }
        otherwise(self, &characters(rest))
    }
}

/// Attribute sets compare without regard to order.
fn same_attributes(a: &Tag, b: &Tag) -> bool {
    a.attributes.len() == b.attributes.len()
        && a
            .attributes
            .iter()
            .all(|attr| b.attributes.get(&attr.name) == Some(attr.value.as_str()))
}

impl TokenSink for HtmlTreeBuilder {
    fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.core.tokenizer
    }

    fn process(&mut self, token: &Token) -> Result<bool, Fault> {
        if mem::take(&mut self.skip_leading_newline)
            && let Token::Characters(text) = token
            && let Some(rest) = text.data.strip_prefix('\n')
        {
            if rest.is_empty() {
                return Ok(true);
            }
            return self.dispatch(&characters(rest));
        }
        self.dispatch(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_leading_whitespace() {
        assert_eq!(split_leading_whitespace("  \nabc "), ("  \n", "abc "));
        assert_eq!(split_leading_whitespace("abc"), ("", "abc"));
        assert_eq!(split_leading_whitespace(" \t"), (" \t", ""));
    }

    #[test]
    fn test_scope_boundaries() {
        assert!(Scope::Default.is_boundary("TABLE"));
        assert!(!Scope::Default.is_boundary("div"));
        assert!(Scope::Button.is_boundary("button"));
        assert!(Scope::ListItem.is_boundary("ul"));
        assert!(Scope::Select.is_boundary("div"));
        assert!(!Scope::Select.is_boundary("option"));
    }

    #[test]
    fn test_same_attributes_ignores_order() {
        let mut a = Tag::named("b");
        a.attributes.put("x", "1");
        a.attributes.put("y", "2");
        let mut b = Tag::named("b");
        b.attributes.put("y", "2");
        b.attributes.put("x", "1");
        assert!(same_attributes(&a, &b));
        b.attributes.put("x", "3");
        assert!(!same_attributes(&a, &b));
    }
}
