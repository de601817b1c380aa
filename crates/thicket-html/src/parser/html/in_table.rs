//! Table and select insertion modes.
//!
//! [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
//! through
//! [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable).

use super::InsertionMode::{
    InBody, InCaption, InCell, InColumnGroup, InHead, InRow, InSelect, InTable, InTableBody,
    InTableText,
};
use super::in_body::is_hidden_input;
use super::{HtmlTreeBuilder, Scope, is_whitespace, name_in};
use crate::error::Fault;
use crate::tokenizer::{Characters, Tag, Token};

/// "clear the stack back to a table context"
const TABLE_CONTEXT: &[&str] = &["table", "template", "html"];

/// "clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[&str] = &["tbody", "tfoot", "thead", "template", "html"];

/// "clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[&str] = &["tr", "template", "html"];

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

/// Start tags that end a caption, a row group or a cell.
const TABLE_STRUCTURE_STARTS: &[&str] = &[
    "caption", "col", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
];

impl HtmlTreeBuilder {
    /// Pop until the current node is one of `context`.
    fn clear_stack_back_to(&mut self, context: &[&str]) -> Result<(), Fault> {
        while self.core.stack.len() > 1 && !self.current_is_any(context) {
            let _ = self.core.pop()?;
        }
        Ok(())
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element: Let the pending table
            // character tokens be an empty list of tokens. Let the original
            // insertion mode be the current insertion mode. Switch the
            // insertion mode to "in table text" and reprocess the token."
            Token::Characters(_)
                if self.current_is_any(&["table", "tbody", "template", "tfoot", "thead", "tr"]) =>
            {
                self.pending_table_text.clear();
                self.original_mode = self.mode;
                self.reprocess(InTableText, token)
            }
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => self.in_table_start_tag(tag, token),
            Token::EndTag(tag) => match tag.normal_name() {
                // "If the stack of open elements does not have a table element
                // in table scope, this is a parse error; ignore the token.
                // Otherwise: Pop elements from this stack until a table element
                // has been popped from the stack. Reset the insertion mode
                // appropriately."
                "table" => {
                    if !self.in_table_scope("table") {
                        return self.ignore(token);
                    }
                    self.pop_until("table")?;
                    self.reset_insertion_mode();
                    Ok(true)
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.ignore(token),
                _ => self.in_table_anything_else(token),
            },
            // "An end-of-file token: Process the token using the rules for the
            // "in body" insertion mode."
            Token::EndOfInput => self.process_using(InBody, token),
            Token::Characters(_) => self.in_table_anything_else(token),
        }
    }

    fn in_table_start_tag(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        match tag.normal_name() {
            "caption" => {
                self.clear_stack_back_to(TABLE_CONTEXT)?;
                self.push_marker();
                let _ = self.insert_element(tag)?;
                self.switch_to(InCaption);
                Ok(true)
            }
            "colgroup" => {
                self.clear_stack_back_to(TABLE_CONTEXT)?;
                let _ = self.insert_element(tag)?;
                self.switch_to(InColumnGroup);
                Ok(true)
            }
            // "Clear the stack back to a table context. Insert an HTML element
            // for a "colgroup" start tag token with no attributes, then switch
            // the insertion mode to "in column group". Reprocess the current token."
            "col" => {
                self.clear_stack_back_to(TABLE_CONTEXT)?;
                let _ = self.insert_implied("colgroup")?;
                self.reprocess(InColumnGroup, token)
            }
            "tbody" | "tfoot" | "thead" => {
                self.clear_stack_back_to(TABLE_CONTEXT)?;
                let _ = self.insert_element(tag)?;
                self.switch_to(InTableBody);
                Ok(true)
            }
            "td" | "th" | "tr" => {
                self.clear_stack_back_to(TABLE_CONTEXT)?;
                let _ = self.insert_implied("tbody")?;
                self.reprocess(InTableBody, token)
            }
            // "A start tag whose tag name is "table": Parse error. If the stack
            // of open elements does not have a table element in table scope,
            // ignore the token. Otherwise: Pop elements from this stack until a
            // table element has been popped from the stack. Reset the insertion
            // mode appropriately. Reprocess the token."
            "table" => {
                self.parse_error(token);
                if !self.in_table_scope("table") {
                    return Ok(false);
                }
                self.pop_until("table")?;
                self.reset_insertion_mode();
                self.dispatch(token)
            }
            "style" | "script" => self.process_using(InHead, token),
            "input" if is_hidden_input(tag) => {
                self.parse_error(token);
                let _ = self.insert_void(tag)?;
                Ok(true)
            }
            // "If there is a template element on the stack of open elements, or
            // if the form element pointer is not null, ignore the token.
            // Otherwise: Insert an HTML element for the token, and set the form
            // element pointer to point to the element created. Pop that form
            // element off the stack of open elements."
            "form" => {
                self.parse_error(token);
                if self.stack_has_named("template") || self.form.is_some() {
                    return Ok(false);
                }
                let form = self.insert_element(tag)?;
                self.form = Some(form);
                let _ = self.core.pop()?;
                Ok(true)
            }
            _ => self.in_table_anything_else(token),
        }
    }

    /// "Parse error. Enable foster parenting, process the token using the
    /// rules for the "in body" insertion mode, and then disable foster parenting."
    fn in_table_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        self.parse_error(token);
        self.foster_parenting = true;
        let result = self.process_using(InBody, token);
        self.foster_parenting = false;
        result
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        if let Token::Characters(text) = token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the token."
            if text.data.contains('\0') {
                self.core.error("unexpected null character");
                self.pending_table_text
                    .extend(text.data.chars().filter(|&c| c != '\0'));
            } else {
                self.pending_table_text.push_str(&text.data);
            }
            return Ok(true);
        }

        // "Anything else: If any of the tokens in the pending table character
        // tokens list are character tokens that are not ASCII whitespace, then
        // this is a parse error: reprocess the character tokens in the pending
        // table character tokens list using the rules given in the "anything
        // else" entry in the "in table" insertion mode. Otherwise, insert the
        // characters given by the pending table character tokens list."
        let pending = std::mem::take(&mut self.pending_table_text);
        if pending.chars().all(is_whitespace) {
            self.insert_text(&pending)?;
        } else {
            let _ = self.in_table_anything_else(&Token::Characters(Characters {
                data: pending,
                cdata: false,
            }))?;
        }

        // "Switch the insertion mode to the original insertion mode and
        // reprocess the token."
        self.reprocess(self.original_mode, token)
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::EndTag(tag) if tag.normal_name() == "caption" => {
                if !self.in_table_scope("caption") {
                    return self.ignore(token);
                }
                self.close_caption()?;
                Ok(true)
            }
            Token::StartTag(tag) if name_in(tag.normal_name(), TABLE_STRUCTURE_STARTS) => {
                self.caption_then_table(token)
            }
            Token::EndTag(tag) if tag.normal_name() == "table" => self.caption_then_table(token),
            Token::EndTag(tag)
                if name_in(
                    tag.normal_name(),
                    &[
                        "body", "col", "colgroup", "html", "tbody", "td", "tfoot", "th", "thead",
                        "tr",
                    ],
                ) =>
            {
                self.ignore(token)
            }
            _ => self.process_using(InBody, token),
        }
    }

    /// "If the stack of open elements does not have a caption element in
    /// table scope, this is a parse error; ignore the token. Otherwise: close
    /// the caption, then reprocess the token."
    fn caption_then_table(&mut self, token: &Token) -> Result<bool, Fault> {
        if !self.in_table_scope("caption") {
            return self.ignore(token);
        }
        self.close_caption()?;
        self.dispatch(token)
    }

    /// "Generate implied end tags. Now, if the current node is not a caption
    /// element, then this is a parse error. Pop elements from this stack until
    /// a caption element has been popped from the stack. Clear the list of
    /// active formatting elements up to the last marker. Switch the insertion
    /// mode to "in table"."
    fn close_caption(&mut self) -> Result<(), Fault> {
        self.generate_implied_end_tags()?;
        if !self.current_is("caption") {
            self.core.error("closing caption with other elements open");
        }
        self.pop_until("caption")?;
        self.clear_formatting_to_last_marker();
        self.switch_to(InTable);
        Ok(())
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => self.split_characters(
                text,
                Self::insert_text,
                Self::column_group_anything_else,
            ),
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => match tag.normal_name() {
                "html" => self.process_using(InBody, token),
                "col" => {
                    let _ = self.insert_void(tag)?;
                    Ok(true)
                }
                _ => self.column_group_anything_else(token),
            },
            Token::EndTag(tag) => match tag.normal_name() {
                // "If the current node is not a colgroup element, then this is
                // a parse error; ignore the token. Otherwise, pop the current
                // node from the stack of open elements. Switch the insertion
                // mode to "in table"."
                "colgroup" => {
                    if !self.current_is("colgroup") {
                        return self.ignore(token);
                    }
                    let _ = self.core.pop()?;
                    self.switch_to(InTable);
                    Ok(true)
                }
                "col" => self.ignore(token),
                _ => self.column_group_anything_else(token),
            },
            Token::EndOfInput => self.process_using(InBody, token),
        }
    }

    /// "If the current node is not a colgroup element, then this is a parse
    /// error; ignore the token. Otherwise, pop the current node from the stack
    /// of open elements. Switch the insertion mode to "in table". Reprocess the
    /// token."
    fn column_group_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        if !self.current_is("colgroup") {
            return self.ignore(token);
        }
        let _ = self.core.pop()?;
        self.reprocess(InTable, token)
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::StartTag(tag) => match tag.normal_name() {
                "tr" => {
                    self.clear_stack_back_to(TABLE_BODY_CONTEXT)?;
                    let _ = self.insert_element(tag)?;
                    self.switch_to(InRow);
                    Ok(true)
                }
                // "Parse error. Clear the stack back to a table body context.
                // Insert an HTML element for a "tr" start tag token with no
                // attributes, then switch the insertion mode to "in row".
                // Reprocess the current token."
                "th" | "td" => {
                    self.parse_error(token);
                    self.clear_stack_back_to(TABLE_BODY_CONTEXT)?;
                    let _ = self.insert_implied("tr")?;
                    self.reprocess(InRow, token)
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.close_table_section_then_table(token)
                }
                _ => self.process_using(InTable, token),
            },
            Token::EndTag(tag) => match tag.normal_name() {
                name @ ("tbody" | "tfoot" | "thead") => {
                    if !self.in_table_scope(name) {
                        return self.ignore(token);
                    }
                    self.clear_stack_back_to(TABLE_BODY_CONTEXT)?;
                    let _ = self.core.pop()?;
                    self.switch_to(InTable);
                    Ok(true)
                }
                "table" => self.close_table_section_then_table(token),
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr" => {
                    self.ignore(token)
                }
                _ => self.process_using(InTable, token),
            },
            _ => self.process_using(InTable, token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token.
    /// Otherwise: Clear the stack back to a table body context. Pop the current
    /// node from the stack of open elements. Switch the insertion mode to "in
    /// table". Reprocess the token."
    fn close_table_section_then_table(&mut self, token: &Token) -> Result<bool, Fault> {
        if !self.in_scope_of(TABLE_SECTIONS, Scope::Table) {
            return self.ignore(token);
        }
        self.clear_stack_back_to(TABLE_BODY_CONTEXT)?;
        let _ = self.core.pop()?;
        self.reprocess(InTable, token)
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::StartTag(tag) => match tag.normal_name() {
                // "Clear the stack back to a table row context. Insert an HTML
                // element for the token, then switch the insertion mode to "in
                // cell". Insert a marker at the end of the list of active
                // formatting elements."
                "th" | "td" => {
                    self.clear_stack_back_to(TABLE_ROW_CONTEXT)?;
                    let _ = self.insert_element(tag)?;
                    self.switch_to(InCell);
                    self.push_marker();
                    Ok(true)
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr" => {
                    self.close_row_then(InTableBody, token)
                }
                _ => self.process_using(InTable, token),
            },
            Token::EndTag(tag) => match tag.normal_name() {
                "tr" => {
                    if !self.in_table_scope("tr") {
                        return self.ignore(token);
                    }
                    self.close_row()?;
                    Ok(true)
                }
                "table" => self.close_row_then(InTableBody, token),
                name @ ("tbody" | "tfoot" | "thead") => {
                    if !self.in_table_scope(name) {
                        return self.ignore(token);
                    }
                    self.close_row_then(InTableBody, token)
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" => {
                    self.ignore(token)
                }
                _ => self.process_using(InTable, token),
            },
            _ => self.process_using(InTable, token),
        }
    }

    /// "Clear the stack back to a table row context. Pop the current node
    /// (which will be a tr element) from the stack of open elements. Switch the
    /// insertion mode to "in table body"."
    fn close_row(&mut self) -> Result<(), Fault> {
        self.clear_stack_back_to(TABLE_ROW_CONTEXT)?;
        let _ = self.core.pop()?;
        self.switch_to(InTableBody);
        Ok(())
    }

    /// "If the stack of open elements does not have a tr element in table
    /// scope, this is a parse error; ignore the token. Otherwise: close the
    /// row, then reprocess the token."
    fn close_row_then(
        &mut self,
        mode: super::InsertionMode,
        token: &Token,
    ) -> Result<bool, Fault> {
        if !self.in_table_scope("tr") {
            return self.ignore(token);
        }
        self.close_row()?;
        self.reprocess(mode, token)
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::EndTag(tag) => match tag.normal_name() {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element and with the same tag
                // name as that of the token, then this is a parse error; ignore
                // the token."
                name @ ("td" | "th") => {
                    if !self.in_table_scope(name) {
                        return self.ignore(token);
                    }
                    self.generate_implied_end_tags()?;
                    if !self.current_is(name) {
                        self.parse_error(token);
                    }
                    self.pop_until(name)?;
                    self.clear_formatting_to_last_marker();
                    self.switch_to(InRow);
                    Ok(true)
                }
                "body" | "caption" | "col" | "colgroup" | "html" => self.ignore(token),
                name @ ("table" | "tbody" | "tfoot" | "thead" | "tr") => {
                    if !self.in_table_scope(name) {
                        return self.ignore(token);
                    }
                    self.close_cell()?;
                    self.dispatch(token)
                }
                _ => self.process_using(InBody, token),
            },
            Token::StartTag(tag) if name_in(tag.normal_name(), TABLE_STRUCTURE_STARTS) => {
                if !self.in_scope_of(&["td", "th"], Scope::Table) {
                    return self.ignore(token);
                }
                self.close_cell()?;
                self.dispatch(token)
            }
            _ => self.process_using(InBody, token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Generate implied end tags. If the current node is not now a td element
    /// or a th element, then this is a parse error. Pop elements from the stack
    /// of open elements until a td element or a th element has been popped from
    /// the stack. Clear the list of active formatting elements up to the last
    /// marker. Switch the insertion mode to "in row"."
    fn close_cell(&mut self) -> Result<(), Fault> {
        self.generate_implied_end_tags()?;
        if !self.current_is_any(&["td", "th"]) {
            self.core.error("closing table cell with other elements open");
        }
        self.pop_until_any(&["td", "th"])?;
        self.clear_formatting_to_last_marker();
        self.switch_to(InRow);
        Ok(())
    }

    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => {
                if text.data.contains('\0') {
                    self.core.error("unexpected null character");
                    self.insert_text(&text.data.replace('\0', ""))?;
                } else {
                    self.insert_text(&text.data)?;
                }
                Ok(true)
            }
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => self.in_select_start_tag(tag, token),
            Token::EndTag(tag) => match tag.normal_name() {
                // "First, if the current node is an option element, and the
                // node immediately before it in the stack of open elements is an
                // optgroup element, then pop the current node from the stack of
                // open elements. If the current node is an optgroup element,
                // then pop that node from the stack of open elements. Otherwise,
                // this is a parse error; ignore the token."
                "optgroup" => {
                    let len = self.core.stack.len();
                    if self.current_is("option")
                        && len >= 2
                        && self.core.is_named(self.core.stack[len - 2], "optgroup")
                    {
                        let _ = self.core.pop()?;
                    }
                    if !self.current_is("optgroup") {
                        return self.ignore(token);
                    }
                    let _ = self.core.pop()?;
                    Ok(true)
                }
                "option" => {
                    if !self.current_is("option") {
                        return self.ignore(token);
                    }
                    let _ = self.core.pop()?;
                    Ok(true)
                }
                "select" => {
                    if !self.in_select_scope("select") {
                        return self.ignore(token);
                    }
                    self.pop_until("select")?;
                    self.reset_insertion_mode();
                    Ok(true)
                }
                _ => self.ignore(token),
            },
            Token::EndOfInput => self.process_using(InBody, token),
        }
    }

    fn in_select_start_tag(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        match tag.normal_name() {
            "html" => self.process_using(InBody, token),
            "option" => {
                self.pop_if_current("option")?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "optgroup" => {
                self.pop_if_current("option")?;
                self.pop_if_current("optgroup")?;
                let _ = self.insert_element(tag)?;
                Ok(true)
            }
            "hr" => {
                self.pop_if_current("option")?;
                self.pop_if_current("optgroup")?;
                let _ = self.insert_void(tag)?;
                Ok(true)
            }
            // "A start tag whose tag name is "select": Parse error. If the stack
            // of open elements does not have a select element in select scope,
            // ignore the token. Otherwise: Pop elements from the stack of open
            // elements until a select element has been popped from the stack.
            // Reset the insertion mode appropriately."
            "select" => {
                self.parse_error(token);
                if !self.in_select_scope("select") {
                    return Ok(false);
                }
                self.pop_until("select")?;
                self.reset_insertion_mode();
                Ok(true)
            }
            "input" | "keygen" | "textarea" => {
                self.parse_error(token);
                if !self.in_select_scope("select") {
                    return Ok(false);
                }
                self.pop_until("select")?;
                self.reset_insertion_mode();
                self.dispatch(token)
            }
            "script" => self.process_using(InHead, token),
            _ => self.ignore(token),
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        const TABLE_PARTS: &[&str] = &[
            "caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th",
        ];
        match token {
            // "Parse error. Pop elements from the stack of open elements until a
            // select element has been popped from the stack. Reset the insertion
            // mode appropriately. Reprocess the token."
            Token::StartTag(tag) if name_in(tag.normal_name(), TABLE_PARTS) => {
                self.parse_error(token);
                self.pop_until("select")?;
                self.reset_insertion_mode();
                self.dispatch(token)
            }
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then ignore the token."
            Token::EndTag(tag) if name_in(tag.normal_name(), TABLE_PARTS) => {
                self.parse_error(token);
                if !self.in_table_scope(tag.normal_name()) {
                    return Ok(false);
                }
                self.pop_until("select")?;
                self.reset_insertion_mode();
                self.dispatch(token)
            }
            _ => self.process_using(InSelect, token),
        }
    }
}
