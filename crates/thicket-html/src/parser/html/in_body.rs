//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use thicket_common::warning::warn_once;
use thicket_dom::QuirksMode;

use super::InsertionMode::{
    AfterBody, InCaption, InCell, InFrameset, InHead, InRow, InSelect, InSelectInTable,
    InTable, InTableBody,
};
use super::{HtmlTreeBuilder, SPECIAL_ELEMENTS, is_whitespace, name_in};
use crate::error::Fault;
use crate::tag::TextContent;
use crate::tokenizer::{Characters, Tag, Token};

/// Start tags that close an open `p` and insert a block.
const BLOCK_START_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu",
    "nav", "ol", "p", "search", "section", "summary", "ul",
];

/// End tags that close a block element in scope.
const BLOCK_END_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "listing",
    "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small, strike,
/// strong, tt, and u."
pub(super) const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// Elements still open at end of input without a parse error.
const ALLOWED_OPEN_AT_EOF: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td",
    "tfoot", "th", "thead", "tr", "body", "html",
];

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => self.in_body_characters(text),
            // "A comment token: Insert a comment."
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            // "A DOCTYPE token: Parse error. Ignore the token."
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => self.in_body_start_tag(tag, token),
            Token::EndTag(tag) => self.in_body_end_tag(tag, token),
            Token::EndOfInput => {
                self.check_open_elements_at_eof();
                // "Stop parsing."
                Ok(true)
            }
        }
    }

    /// "A character token that is U+0000 NULL: Parse error. Ignore the token."
    ///
    /// "Any other character token: Reconstruct the active formatting elements,
    /// if any. Insert the token's character. If the token is not whitespace,
    /// set the frameset-ok flag to "not ok"."
    fn in_body_characters(&mut self, text: &Characters) -> Result<bool, Fault> {
        let data = if text.data.contains('\0') {
            self.core.error("unexpected null character");
            text.data.replace('\0', "")
        } else {
            text.data.clone()
        };
        if data.is_empty() {
            return Ok(false);
        }
        self.reconstruct_formatting()?;
        self.insert_text(&data)?;
        if !data.chars().all(is_whitespace) {
            self.frameset_ok = false;
        }
        Ok(true)
    }

    /// "If the stack of open elements has a node that is not either a dd
    /// element, a dt element, an li element, ... then this is a parse error."
    fn check_open_elements_at_eof(&mut self) {
        let unclosed = self
            .core
            .stack
            .iter()
            .find(|&&id| !self.core.is_named_any(id, ALLOWED_OPEN_AT_EOF))
            .and_then(|&id| self.core.tree.tag_name(id))
            .map(str::to_owned);
        if let Some(name) = unclosed {
            self.core
                .error(format_args!("unexpected end of file with [{name}] still open"));
        }
    }

    #[allow(clippy::cognitive_complexity)]
    fn in_body_start_tag(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        let name = tag.normal_name();
        match name {
            // "A start tag whose tag name is "html": Parse error. ... For each
            // attribute on the token, check to see if the attribute is already
            // present on the top element of the stack of open elements. If it
            // is not, add the attribute and its corresponding value to that
            // element."
            "html" => {
                self.parse_error(token);
                if let Some(&html) = self.core.stack.first() {
                    self.merge_attributes(html, tag);
                }
                Ok(true)
            }
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "title" => self.process_using(InHead, token),
            // "A start tag whose tag name is "body": Parse error. If the second
            // element on the stack of open elements is not a body element, if
            // the stack of open elements has only one node on it, ... ignore
            // the token. Otherwise, set the frameset-ok flag to "not ok"; then,
            // for each attribute on the token, check to see if the attribute is
            // already present on the body element ... If it is not, add the
            // attribute and its corresponding value to that element."
            "body" => {
                self.parse_error(token);
                match self.core.stack.get(1).copied() {
                    Some(body) if self.core.is_named(body, "body") => {
                        self.frameset_ok = false;
                        self.merge_attributes(body, tag);
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            "frameset" => self.in_body_frameset(tag, token),
            _ if name_in(name, BLOCK_START_TAGS) => {
                self.close_p_in_button_scope()?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            // "If the current node is an HTML element whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse error;
            // pop the current node off the stack of open elements."
            _ if name_in(name, HEADINGS) => {
                self.close_p_in_button_scope()?;
                if self.current_is_any(HEADINGS) {
                    self.parse_error(token);
                    let _ = self.core.pop()?;
                }
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            // "If the next token is a U+000A LINE FEED (LF) character token,
            // then ignore that token and move on to the next one. (Newlines at
            // the start of pre blocks are ignored as an authoring convenience.)"
            "pre" | "listing" => {
                self.close_p_in_button_scope()?;
                let _ = self.insert_element(tag)?;
                self.skip_leading_newline = true;
                self.frameset_ok = false;
                Ok(true)
            }
            // "If the form element pointer is not null, and there is no
            // template element on the stack of open elements, then this is a
            // parse error; ignore the token."
            "form" => {
                if self.form.is_some() && !self.stack_has_named("template") {
                    return self.ignore(token);
                }
                self.close_p_in_button_scope()?;
                let form = self.insert_element(tag)?;
                if !self.stack_has_named("template") {
                    self.form = Some(form);
                }
                Ok(true)
            }
            "li" => {
                self.close_list_item(&["li"])?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "dd" | "dt" => {
                self.close_list_item(&["dd", "dt"])?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            // "Switch the tokenizer to the PLAINTEXT state." Once a start tag
            // with the tag name "plaintext" has been seen, that will be the last
            // token ever seen other than character tokens.
            "plaintext" => {
                self.close_p_in_button_scope()?;
                let _ = self.insert_element(tag)?;
                self.core.tokenizer.enter_text_content(TextContent::Plaintext);
                Ok(true)
            }
            "button" => {
                if self.in_scope("button") {
                    self.parse_error(token);
                    self.generate_implied_end_tags()?;
                    self.pop_until("button")?;
                }
                self.reconstruct_formatting()?;
                let _ = self.insert_element(tag)?;
                self.frameset_ok = false;
                Ok(true)
            }
            // "If the list of active formatting elements contains an a element
            // between the end of the list and the last marker on the list (or
            // the start of the list if there is no marker on the list), then
            // this is a parse error; run the adoption agency algorithm for the
            // token, then remove that element from the list of active
            // formatting elements and the stack of open elements if the
            // adoption agency algorithm didn't already remove it."
            "a" => {
                if let Some((_, existing)) = self.formatting_element_named("a") {
                    self.parse_error(token);
                    self.run_adoption_agency("a")?;
                    if let Some(index) = self.formatting_index_of(existing) {
                        let _ = self.formatting.remove(index);
                    }
                    self.remove_from_stack(existing);
                }
                self.insert_formatting_element(tag)?;
                Ok(true)
            }
            "nobr" => {
                self.reconstruct_formatting()?;
                if self.in_scope("nobr") {
                    self.parse_error(token);
                    self.run_adoption_agency("nobr")?;
                }
                self.insert_formatting_element(tag)?;
                Ok(true)
            }
            _ if name_in(name, FORMATTING_ELEMENTS) => {
                self.insert_formatting_element(tag)?;
                Ok(true)
            }
            // "Reconstruct the active formatting elements, if any. Insert an
            // HTML element for the token. Insert a marker at the end of the
            // list of active formatting elements. Set the frameset-ok flag to
            // "not ok"."
            "applet" | "marquee" | "object" => {
                self.reconstruct_formatting()?;
                let _ = self.insert_element(tag)?;
                self.push_marker();
                self.frameset_ok = false;
                Ok(true)
            }
            // "If the Document is not set to quirks mode, and the stack of open
            // elements has a p element in button scope, then close a p element."
            "table" => {
                if self.core.tree.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_in_button_scope()?;
                }
                let _ = self.insert_element(tag)?;
                self.frameset_ok = false;
                self.switch_to(InTable);
                Ok(true)
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.insert_void_in_body(tag)?;
                self.frameset_ok = false;
                Ok(true)
            }
            // "If the token does not have an attribute with the name "type", or
            // if it does, but that attribute's value is not an ASCII
            // case-insensitive match for the string "hidden", then: set the
            // frameset-ok flag to "not ok"."
            "input" => {
                self.insert_void_in_body(tag)?;
                if !is_hidden_input(tag) {
                    self.frameset_ok = false;
                }
                Ok(true)
            }
            "param" | "source" | "track" => {
                let _ = self.insert_void(tag)?;
                Ok(true)
            }
            "hr" => {
                self.close_p_in_button_scope()?;
                let _ = self.insert_void(tag)?;
                self.frameset_ok = false;
                Ok(true)
            }
            // "A start tag whose tag name is "image": Parse error. Change the
            // token's tag name to "img" and reprocess it. (Don't ask.)"
            "image" => {
                self.parse_error(token);
                let mut img = Tag::named("img");
                img.attributes = tag.attributes.clone();
                img.self_closing = tag.self_closing;
                self.handle_in_body_mode(&Token::StartTag(img))
            }
            "textarea" => {
                self.skip_leading_newline = true;
                self.frameset_ok = false;
                self.insert_text_element(tag, TextContent::Rcdata)?;
                Ok(true)
            }
            "xmp" => {
                self.close_p_in_button_scope()?;
                self.reconstruct_formatting()?;
                self.frameset_ok = false;
                self.insert_text_element(tag, TextContent::Rawtext)?;
                Ok(true)
            }
            "iframe" => {
                self.frameset_ok = false;
                self.insert_text_element(tag, TextContent::Rawtext)?;
                Ok(true)
            }
            "noembed" => {
                self.insert_text_element(tag, TextContent::Rawtext)?;
                Ok(true)
            }
            // "If the insertion mode is one of "in table", "in caption", "in
            // table body", "in row", or "in cell", then switch the insertion
            // mode to "in select in table". Otherwise, switch the insertion mode
            // to "in select"."
            "select" => {
                self.reconstruct_formatting()?;
                let _ = self.insert_element(tag)?;
                self.frameset_ok = false;
                let mode = if matches!(self.mode, InTable | InCaption | InTableBody | InRow | InCell)
                {
                    InSelectInTable
                } else {
                    InSelect
                };
                self.switch_to(mode);
                Ok(true)
            }
            "optgroup" | "option" => {
                self.pop_if_current("option")?;
                self.reconstruct_formatting()?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "rb" | "rtc" => {
                if self.in_scope("ruby") {
                    self.generate_implied_end_tags()?;
                    if !self.current_is("ruby") {
                        self.parse_error(token);
                    }
                }
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "rp" | "rt" => {
                if self.in_scope("ruby") {
                    self.generate_implied_end_tags_excluding(Some("rtc"))?;
                    if !self.current_is_any(&["ruby", "rtc"]) {
                        self.parse_error(token);
                    }
                }
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "math" | "svg" => {
                warn_once("tree_builder", "foreign content is parsed as ordinary HTML elements");
                self.insert_ordinary(tag)
            }
            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr": Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => self.ignore(token),
            "template" => {
                warn_once("tree_builder", "template contents are parsed as ordinary body content");
                self.insert_ordinary(tag)
            }
            // "Any other start tag: Reconstruct the active formatting elements,
            // if any. Insert an HTML element for the token."
            _ => self.insert_ordinary(tag),
        }
    }

    /// Insert an element that has no special rules. A self-closing flag on
    /// an element that is not void stays unacknowledged.
    fn insert_ordinary(&mut self, tag: &Tag) -> Result<bool, Fault> {
        self.reconstruct_formatting()?;
        let _ = self.insert_element(tag)?;
        Ok(true)
    }

    fn insert_void_in_body(&mut self, tag: &Tag) -> Result<(), Fault> {
        self.reconstruct_formatting()?;
        let _ = self.insert_void(tag)?;
        Ok(())
    }

    fn insert_formatting_element(&mut self, tag: &Tag) -> Result<(), Fault> {
        self.reconstruct_formatting()?;
        let node = self.insert_element(tag)?;
        self.push_formatting_element(node, tag);
        Ok(())
    }

    /// "A start tag whose tag name is "frameset"": replace the body with a
    /// frameset when nothing in the body has ruled it out yet.
    fn in_body_frameset(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        self.parse_error(token);
        let Some(body) = self.core.stack.get(1).copied() else {
            return Ok(false);
        };
        if !self.core.is_named(body, "body") || !self.frameset_ok {
            return Ok(false);
        }
        // "1. Remove the second element on the stack of open elements from its
        //     parent node, if it has one.
        //  2. Pop all the nodes from the bottom of the stack of open elements,
        //     from the current node up to, but not including, the root html
        //     element."
        self.core.tree.detach(body)?;
        self.core.stack.truncate(1);
        // "3. Insert an HTML element for the token.
        //  4. Switch the insertion mode to "in frameset"."
        let _ = self.insert_element(tag)?;
        self.switch_to(InFrameset);
        Ok(true)
    }

    /// The `li` / `dd` / `dt` start tag loop.
    ///
    /// STEP 1: "Set the frameset-ok flag to "not ok"."
    ///
    /// STEP 2-4: "Initialize node to be the current node. Loop: If node is one
    /// of `closes`, then generate implied end tags, except for that element,
    /// pop elements until it has been popped, and jump to done. If node is in
    /// the special category, but is not an address, div, or p element, then
    /// jump to done. Otherwise, set node to the previous entry in the stack of
    /// open elements and return to the step labeled loop."
    ///
    /// STEP 5: "Done: If the stack of open elements has a p element in button
    /// scope, then close a p element."
    fn close_list_item(&mut self, closes: &[&str]) -> Result<(), Fault> {
        self.frameset_ok = false;
        let mut target = None;
        for &node in self.core.stack.iter().rev() {
            let Some(name) = self.core.tree.tag_name(node) else {
                continue;
            };
            if name_in(name, closes) {
                target = Some(name.to_ascii_lowercase());
                break;
            }
            if name_in(name, SPECIAL_ELEMENTS) && !name_in(name, &["address", "div", "p"]) {
                break;
            }
        }
        if let Some(name) = target {
            self.generate_implied_end_tags_excluding(Some(&name))?;
            if !self.current_is(&name) {
                self.core
                    .error(format_args!("implicitly closing [{name}] with other elements open"));
            }
            self.pop_until(&name)?;
        }
        self.close_p_in_button_scope()
    }

    #[allow(clippy::cognitive_complexity)]
    fn in_body_end_tag(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        let name = tag.normal_name();
        match name {
            // "An end tag whose tag name is "body": If the stack of open
            // elements does not have a body element in scope, this is a parse
            // error; ignore the token. Otherwise ... switch the insertion mode
            // to "after body"."
            "body" => {
                if !self.in_scope("body") {
                    return self.ignore(token);
                }
                self.check_open_elements_at_eof();
                self.switch_to(AfterBody);
                Ok(true)
            }
            "html" => {
                if !self.in_scope("body") {
                    return self.ignore(token);
                }
                self.check_open_elements_at_eof();
                self.reprocess(AfterBody, token)
            }
            "template" => self.any_other_end_tag(name, token),
            _ if name_in(name, BLOCK_END_TAGS) => {
                if !self.in_scope(name) {
                    return self.ignore(token);
                }
                self.close_element_in_scope(name, token)
            }
            "form" => self.in_body_end_form(token),
            // "If the stack of open elements does not have a p element in button
            // scope, then this is a parse error; insert an HTML element for a
            // "p" start tag token with no attributes. Close a p element."
            "p" => {
                if !self.in_button_scope("p") {
                    self.parse_error(token);
                    let _ = self.insert_implied("p")?;
                }
                self.close_p_element()?;
                Ok(true)
            }
            "li" => {
                if !self.in_list_item_scope("li") {
                    return self.ignore(token);
                }
                self.close_element_in_scope(name, token)
            }
            "dd" | "dt" => {
                if !self.in_scope(name) {
                    return self.ignore(token);
                }
                self.close_element_in_scope(name, token)
            }
            // "If the stack of open elements does not have an element in scope
            // that is an HTML element and whose tag name is one of "h1", "h2",
            // "h3", "h4", "h5", or "h6", then this is a parse error; ignore the
            // token."
            _ if name_in(name, HEADINGS) => {
                if !self.in_scope_of(HEADINGS, super::Scope::Default) {
                    return self.ignore(token);
                }
                self.generate_implied_end_tags()?;
                if !self.current_is(name) {
                    self.parse_error(token);
                }
                self.pop_until_any(HEADINGS)?;
                Ok(true)
            }
            _ if name_in(name, FORMATTING_ELEMENTS) => {
                self.run_adoption_agency(name)?;
                Ok(true)
            }
            "applet" | "marquee" | "object" => {
                if !self.in_scope(name) {
                    return self.ignore(token);
                }
                self.generate_implied_end_tags()?;
                if !self.current_is(name) {
                    self.parse_error(token);
                }
                self.pop_until(name)?;
                self.clear_formatting_to_last_marker();
                Ok(true)
            }
            // "An end tag whose tag name is "br": Parse error. Drop the
            // attributes from the token, and act as described in the next
            // entry; i.e. act as if this was a "br" start tag token with no
            // attributes, rather than the end tag token that it actually is."
            "br" => {
                self.parse_error(token);
                self.insert_void_in_body(&Tag::named("br"))?;
                self.frameset_ok = false;
                Ok(true)
            }
            _ => self.any_other_end_tag(name, token),
        }
    }

    /// "Generate implied end tags. If the current node is not an HTML element
    /// with the same tag name as that of the token, then this is a parse error.
    /// Pop elements from the stack of open elements until an HTML element with
    /// the same tag name as the token has been popped from the stack."
    fn close_element_in_scope(&mut self, name: &str, token: &Token) -> Result<bool, Fault> {
        self.generate_implied_end_tags_excluding(Some(name))?;
        if !self.current_is(name) {
            self.parse_error(token);
        }
        self.pop_until(name)?;
        Ok(true)
    }

    /// "An end tag whose tag name is "form""
    fn in_body_end_form(&mut self, token: &Token) -> Result<bool, Fault> {
        if self.stack_has_named("template") {
            if !self.in_scope("form") {
                return self.ignore(token);
            }
            return self.close_element_in_scope("form", token);
        }
        // "1. Let node be the element that the form element pointer is set to,
        //     or null if it is not set to an element.
        //  2. Set the form element pointer to null.
        //  3. If node is null or if the stack of open elements does not have
        //     node in scope, then this is a parse error; return and ignore the
        //     token."
        let Some(node) = self.form.take() else {
            return self.ignore(token);
        };
        if !self.node_in_scope(node) {
            return self.ignore(token);
        }
        // "4. Generate implied end tags.
        //  5. If the current node is not node, then this is a parse error.
        //  6. Remove node from the stack of open elements."
        self.generate_implied_end_tags()?;
        if self.current_node() != node {
            self.parse_error(token);
        }
        self.remove_from_stack(node);
        Ok(true)
    }

    /// "Any other end tag"
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node of
    ///          the stack)."
    ///
    /// STEP 2: "Loop: If node is an HTML element with the same tag name as the
    ///          token, then: generate implied end tags, except for HTML elements
    ///          with the same tag name as the token. If node is not the current
    ///          node, then this is a parse error. Pop all the nodes from the
    ///          current node up to node, including node, then stop these steps."
    ///
    /// STEP 3: "Otherwise, if node is in the special category, then this is a
    ///          parse error; ignore the token, and return."
    ///
    /// STEP 4: "Set node to the previous entry in the stack of open elements."
    pub(super) fn any_other_end_tag(&mut self, name: &str, token: &Token) -> Result<bool, Fault> {
        let mut found = None;
        for &node in self.core.stack.iter().rev() {
            let Some(node_name) = self.core.tree.tag_name(node) else {
                continue;
            };
            if node_name.eq_ignore_ascii_case(name) {
                found = Some(node);
                break;
            }
            if name_in(node_name, SPECIAL_ELEMENTS) {
                break;
            }
        }
        let Some(node) = found else {
            return self.ignore(token);
        };
        self.generate_implied_end_tags_excluding(Some(name))?;
        if self.current_node() != node {
            self.parse_error(token);
        }
        self.pop_until_node(node)?;
        Ok(true)
    }
}

/// `<input type=hidden>` does not affect layout and does not rule out a frameset.
pub(super) fn is_hidden_input(tag: &Tag) -> bool {
    tag.attributes
        .get_ignore_case("type")
        .is_some_and(|value| value.eq_ignore_ascii_case("hidden"))
}
