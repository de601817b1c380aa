//! Insertion modes outside the body and table families.

use thicket_common::warning::warn_once;
use thicket_dom::{DocumentTypeData, NodeData, NodeId, QuirksMode};

use super::InsertionMode::{
    AfterAfterBody, AfterAfterFrameset, AfterFrameset, AfterHead, BeforeHead, BeforeHtml, InBody,
    InFrameset, InHead, InHeadNoscript,
};
use super::{HtmlTreeBuilder, characters, is_whitespace, quirks};
use crate::error::Fault;
use crate::tag::TextContent;
use crate::tokenizer::{Doctype, Tag, Token};

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE: Ignore the token."
            Token::Characters(text) => {
                self.split_characters(text, |_, _| Ok(()), Self::initial_anything_else)
            }
            // "A comment token: Insert a comment as the last child of the Document object."
            Token::Comment(comment) => {
                self.insert_comment_in(NodeId::ROOT, &comment.data)?;
                Ok(true)
            }
            Token::Doctype(doctype) => {
                self.insert_doctype(doctype)?;
                // "Then, switch the insertion mode to "before html"."
                self.switch_to(BeforeHtml);
                Ok(true)
            }
            _ => self.initial_anything_else(token),
        }
    }

    /// "If the document is not an iframe srcdoc document, then this is a parse
    /// error; if the parser cannot change the mode flag is false, set the
    /// Document to quirks mode. In any case, switch the insertion mode to
    /// "before html", then reprocess the token."
    fn initial_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        self.core.error("missing doctype");
        self.core.tree.set_quirks_mode(QuirksMode::Quirks);
        self.reprocess(BeforeHtml, token)
    }

    /// "Append a DocumentType node to the Document node, with its name set to
    /// the name given in the DOCTYPE token, or the empty string if the name was
    /// missing; its public ID set to the public identifier given in the DOCTYPE
    /// token, or the empty string if the public identifier was missing; and its
    /// system ID set to the system identifier given in the DOCTYPE token, or the
    /// empty string if the system identifier was missing."
    fn insert_doctype(&mut self, doctype: &Doctype) -> Result<(), Fault> {
        if !quirks::is_conforming(doctype) {
            self.core.error(format_args!("non-conforming doctype {doctype}"));
        }
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
        let _ = self
            .core
            .insert_at(NodeId::ROOT, None, NodeData::DocumentType(data))?;

        let mode = quirks::classify(doctype);
        log::debug!(target: "thicket::tree_builder", "document mode {mode:?}");
        self.core.tree.set_quirks_mode(mode);
        Ok(())
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A DOCTYPE token: Parse error. Ignore the token."
            Token::Doctype(_) => self.ignore(token),
            // "A comment token: Insert a comment as the last child of the Document object."
            Token::Comment(comment) => {
                self.insert_comment_in(NodeId::ROOT, &comment.data)?;
                Ok(true)
            }
            Token::Characters(text) => {
                self.split_characters(text, |_, _| Ok(()), Self::before_html_anything_else)
            }
            // "A start tag whose tag name is "html": Create an element for the
            // token in the HTML namespace, with the Document as the intended
            // parent. Append it to the Document object. Put this element in the
            // stack of open elements."
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                let element = self.core.element_for(tag);
                let html = self
                    .core
                    .insert_at(NodeId::ROOT, None, NodeData::Element(element))?;
                self.core.stack.push(html);
                self.switch_to(BeforeHead);
                Ok(true)
            }
            Token::EndTag(tag) if matches!(tag.normal_name(), "head" | "body" | "html" | "br") => {
                self.before_html_anything_else(token)
            }
            // "Any other end tag: Parse error. Ignore the token."
            Token::EndTag(_) => self.ignore(token),
            _ => self.before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements. Switch the insertion mode to "before head", then reprocess the
    /// token."
    fn before_html_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        let html = self
            .core
            .insert_at(NodeId::ROOT, None, NodeData::element("html"))?;
        self.core.stack.push(html);
        self.reprocess(BeforeHead, token)
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => {
                self.split_characters(text, |_, _| Ok(()), Self::before_head_anything_else)
            }
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            // "A start tag whose tag name is "html": Process the token using the
            // rules for the "in body" insertion mode."
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            // "A start tag whose tag name is "head": Insert an HTML element for
            // the token. Set the head element pointer to the newly created head
            // element. Switch the insertion mode to "in head"."
            Token::StartTag(tag) if tag.normal_name() == "head" => {
                let head = self.insert_element(tag)?;
                self.head = Some(head);
                self.switch_to(InHead);
                Ok(true)
            }
            Token::EndTag(tag) if matches!(tag.normal_name(), "head" | "body" | "html" | "br") => {
                self.before_head_anything_else(token)
            }
            Token::EndTag(_) => self.ignore(token),
            _ => self.before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no attributes.
    /// Set the head element pointer to the newly created head element. Switch
    /// the insertion mode to "in head". Reprocess the current token."
    fn before_head_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        let head = self.insert_implied("head")?;
        self.head = Some(head);
        self.reprocess(InHead, token)
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A character token that is whitespace: Insert the character."
            Token::Characters(text) => {
                self.split_characters(text, Self::insert_text, Self::in_head_anything_else)
            }
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => self.in_head_start_tag(tag, token),
            // "An end tag whose tag name is "head": Pop the current node (which
            // will be the head element) off the stack of open elements. Switch
            // the insertion mode to "after head"."
            Token::EndTag(tag) if tag.normal_name() == "head" => {
                let _ = self.core.pop()?;
                self.switch_to(AfterHead);
                Ok(true)
            }
            Token::EndTag(tag) if matches!(tag.normal_name(), "body" | "html" | "br") => {
                self.in_head_anything_else(token)
            }
            Token::EndTag(_) => self.ignore(token),
            Token::EndOfInput => self.in_head_anything_else(token),
        }
    }

    fn in_head_start_tag(&mut self, tag: &Tag, token: &Token) -> Result<bool, Fault> {
        match tag.normal_name() {
            "html" => self.process_using(InBody, token),
            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link": Insert an HTML element for the token.
            // Immediately pop the current node off the stack of open elements."
            "base" | "basefont" | "bgsound" | "link" | "meta" => {
                let _ = self.insert_void(tag)?;
                if tag.normal_name() == "base" {
                    self.apply_base_href(tag);
                }
                Ok(true)
            }
            // "A start tag whose tag name is "title": Follow the generic RCDATA
            // element parsing algorithm."
            "title" => {
                self.insert_text_element(tag, TextContent::Rcdata)?;
                Ok(true)
            }
            // "A start tag whose tag name is one of: "noframes", "style": Follow
            // the generic raw text element parsing algorithm."
            "noframes" | "style" => {
                self.insert_text_element(tag, TextContent::Rawtext)?;
                Ok(true)
            }
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is disabled: Insert an HTML element for the token. Switch the
            // insertion mode to "in head noscript"."
            "noscript" => {
                let _ = self.insert_element(tag)?;
                self.switch_to(InHeadNoscript);
                Ok(true)
            }
            // "A start tag whose tag name is "script"": insert, switch the
            // tokenizer to the script data state and the insertion mode to "text".
            "script" => {
                self.insert_text_element(tag, TextContent::ScriptData)?;
                Ok(true)
            }
            // "A start tag whose tag name is "head": Parse error. Ignore the token."
            "head" => self.ignore(token),
            "template" => {
                warn_once("tree_builder", "template contents are parsed as ordinary body content");
                self.in_head_anything_else(token)
            }
            _ => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the token."
    fn in_head_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        let _ = self.core.pop()?;
        self.reprocess(AfterHead, token)
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            // "An end tag whose tag name is "noscript": Pop the current node
            // (which will be a noscript element) from the stack of open
            // elements; the new current node will be a head element. Switch the
            // insertion mode to "in head"."
            Token::EndTag(tag) if tag.normal_name() == "noscript" => {
                let _ = self.core.pop()?;
                self.switch_to(InHead);
                Ok(true)
            }
            // "A character token that is whitespace, a comment token, a start
            // tag whose tag name is one of: "basefont", "bgsound", "link",
            // "meta", "noframes", "style": Process the token using the rules
            // for the "in head" insertion mode."
            Token::Characters(text) => self.split_characters(
                text,
                |this, whitespace| this.insert_text(whitespace),
                Self::in_head_noscript_anything_else,
            ),
            Token::Comment(_) => self.process_using(InHead, token),
            Token::StartTag(tag)
                if matches!(
                    tag.normal_name(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.process_using(InHead, token)
            }
            Token::EndTag(tag) if tag.normal_name() == "br" => {
                self.in_head_noscript_anything_else(token)
            }
            Token::StartTag(tag) if matches!(tag.normal_name(), "head" | "noscript") => {
                self.ignore(token)
            }
            Token::EndTag(_) => self.ignore(token),
            _ => self.in_head_noscript_anything_else(token),
        }
    }

    /// "Parse error. Pop the current node (which will be a noscript element)
    /// from the stack of open elements; the new current node will be a head
    /// element. Switch the insertion mode to "in head". Reprocess the token."
    fn in_head_noscript_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        self.parse_error(token);
        let _ = self.core.pop()?;
        self.reprocess(InHead, token)
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => {
                self.split_characters(text, Self::insert_text, Self::after_head_anything_else)
            }
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => match tag.normal_name() {
                "html" => self.process_using(InBody, token),
                // "A start tag whose tag name is "body": Insert an HTML element
                // for the token. Set the frameset-ok flag to "not ok". Switch
                // the insertion mode to "in body"."
                "body" => {
                    let _ = self.insert_element(tag)?;
                    self.frameset_ok = false;
                    self.switch_to(InBody);
                    Ok(true)
                }
                "frameset" => {
                    let _ = self.insert_element(tag)?;
                    self.switch_to(InFrameset);
                    Ok(true)
                }
                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link", "meta", "noframes", "script", "style",
                // "template", "title": Parse error. Push the node pointed to by
                // the head element pointer onto the stack of open elements.
                // Process the token using the rules for the "in head" insertion
                // mode. Remove the node pointed to by the head element pointer
                // from the stack of open elements."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "title" => {
                    self.parse_error(token);
                    let Some(head) = self.head else {
                        return Err(Fault::Unreachable("after head without a head element"));
                    };
                    self.core.stack.push(head);
                    let handled = self.process_using(InHead, token)?;
                    self.remove_from_stack(head);
                    Ok(handled)
                }
                "head" => self.ignore(token),
                _ => self.after_head_anything_else(token),
            },
            Token::EndTag(tag) if matches!(tag.normal_name(), "body" | "html" | "br") => {
                self.after_head_anything_else(token)
            }
            Token::EndTag(_) => self.ignore(token),
            Token::EndOfInput => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no attributes.
    /// Switch the insertion mode to "in body". Reprocess the current token."
    fn after_head_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        let _ = self.insert_implied("body")?;
        self.reprocess(InBody, token)
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A character token: Insert the token's character."
            Token::Characters(text) => {
                self.insert_text(&text.data)?;
                Ok(true)
            }
            // "An end-of-file token: Parse error. ... Pop the current node off
            // the stack of open elements. Switch the insertion mode to the
            // original insertion mode and reprocess the token."
            Token::EndOfInput => {
                self.parse_error(token);
                let _ = self.core.pop()?;
                self.reprocess(self.original_mode, token)
            }
            // "Any other end tag: Pop the current node off the stack of open
            // elements. Switch the insertion mode to the original insertion mode."
            Token::EndTag(_) => {
                let _ = self.core.pop()?;
                self.switch_to(self.original_mode);
                Ok(true)
            }
            _ => self.ignore(token),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            // "A character token that is whitespace: Process the token using
            // the rules for the "in body" insertion mode."
            Token::Characters(text) => self.split_characters(
                text,
                |this, whitespace| this.process_using(InBody, &characters(whitespace)).map(drop),
                Self::after_body_anything_else,
            ),
            // "A comment token: Insert a comment as the last child of the first
            // element in the stack of open elements (the html element)."
            Token::Comment(comment) => {
                let html = self.core.stack.first().copied().unwrap_or(NodeId::ROOT);
                self.insert_comment_in(html, &comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            // "An end tag whose tag name is "html": ... Switch the insertion
            // mode to "after after body"."
            Token::EndTag(tag) if tag.normal_name() == "html" => {
                self.switch_to(AfterAfterBody);
                Ok(true)
            }
            // "An end-of-file token: Stop parsing."
            Token::EndOfInput => Ok(true),
            _ => self.after_body_anything_else(token),
        }
    }

    /// "Parse error. Switch the insertion mode to "in body" and reprocess the token."
    fn after_body_anything_else(&mut self, token: &Token) -> Result<bool, Fault> {
        self.parse_error(token);
        self.reprocess(InBody, token)
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => self.frameset_characters(&text.data),
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) => match tag.normal_name() {
                "html" => self.process_using(InBody, token),
                "frameset" => {
                    let _ = self.insert_element(tag)?;
                    Ok(true)
                }
                // "A start tag whose tag name is "frame": Insert an HTML element
                // for the token. Immediately pop the current node off the stack
                // of open elements. Acknowledge the token's self-closing flag."
                "frame" => {
                    let _ = self.insert_void(tag)?;
                    Ok(true)
                }
                "noframes" => self.process_using(InHead, token),
                _ => self.ignore(token),
            },
            // "An end tag whose tag name is "frameset": If the current node is
            // the root html element, then this is a parse error; ignore the
            // token. Otherwise, pop the current node from the stack of open
            // elements. If the parser was not created as part of the HTML
            // fragment parsing algorithm, and the current node is no longer a
            // frameset element, then switch the insertion mode to "after frameset"."
            Token::EndTag(tag) if tag.normal_name() == "frameset" => {
                if self.core.stack.len() <= 1 {
                    return self.ignore(token);
                }
                let _ = self.core.pop()?;
                if !self.current_is("frameset") {
                    self.switch_to(AfterFrameset);
                }
                Ok(true)
            }
            Token::EndTag(_) => self.ignore(token),
            Token::EndOfInput => {
                if self.core.stack.len() > 1 {
                    self.core.error("unexpected end of file in frameset");
                }
                Ok(true)
            }
        }
    }

    /// Whitespace is inserted; every other character is a parse error and dropped.
    fn frameset_characters(&mut self, data: &str) -> Result<bool, Fault> {
        let whitespace: String = data.chars().filter(|&c| is_whitespace(c)).collect();
        if whitespace.len() != data.len() {
            self.core.error("non-whitespace character in frameset");
        }
        self.insert_text(&whitespace)?;
        Ok(!whitespace.is_empty())
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Characters(text) => self.frameset_characters(&text.data),
            Token::Comment(comment) => {
                self.insert_comment(&comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.ignore(token),
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            Token::StartTag(tag) if tag.normal_name() == "noframes" => {
                self.process_using(InHead, token)
            }
            Token::EndTag(tag) if tag.normal_name() == "html" => {
                self.switch_to(AfterAfterFrameset);
                Ok(true)
            }
            Token::EndOfInput => Ok(true),
            _ => self.ignore(token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) -> Result<bool, Fault> {
        match token {
            Token::Comment(comment) => {
                self.insert_comment_in(NodeId::ROOT, &comment.data)?;
                Ok(true)
            }
            // "A DOCTYPE token, a character token that is whitespace, a start
            // tag whose tag name is "html": Process the token using the rules
            // for the "in body" insertion mode."
            Token::Doctype(_) => self.process_using(InBody, token),
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            Token::Characters(text) => self.split_characters(
                text,
                |this, whitespace| this.process_using(InBody, &characters(whitespace)).map(drop),
                Self::after_body_anything_else,
            ),
            Token::EndOfInput => Ok(true),
            _ => self.after_body_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(
        &mut self,
        token: &Token,
    ) -> Result<bool, Fault> {
        match token {
            Token::Comment(comment) => {
                self.insert_comment_in(NodeId::ROOT, &comment.data)?;
                Ok(true)
            }
            Token::Doctype(_) => self.process_using(InBody, token),
            Token::StartTag(tag) if tag.normal_name() == "html" => {
                self.process_using(InBody, token)
            }
            Token::StartTag(tag) if tag.normal_name() == "noframes" => {
                self.process_using(InHead, token)
            }
            Token::Characters(text) => self.split_characters(
                text,
                |this, whitespace| this.process_using(InBody, &characters(whitespace)).map(drop),
                Self::ignore,
            ),
            Token::EndOfInput => Ok(true),
            _ => self.ignore(token),
        }
    }
}
