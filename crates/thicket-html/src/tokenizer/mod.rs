//! Tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard, with the XML flavor reusing the same
//! state machine.
//!
//! The tokenizer is pull based: [`Tokenizer::read`] runs states until one
//! token is ready. Characters are buffered and handed out as a single
//! [`Characters`] run just before the next non-character token.

/// Character reference decoding per § 13.2.5.72.
mod character_reference;
/// Comment, markup declaration and CDATA states.
mod comment_states;
/// Data, RCDATA, RAWTEXT, script data and PLAINTEXT states.
mod data_states;
/// DOCTYPE states.
mod doctype_states;
/// Emission, error reporting and shared state helpers.
mod helpers;
/// Tag and attribute states.
mod tag_states;
/// Token types produced by the tokenizer.
pub mod token;

use std::mem;

use strum_macros::Display;
use thicket_common::ParseErrorList;

pub use character_reference::CharacterReference;
pub use token::{Characters, Comment, Doctype, DoctypeKeyword, Tag, Token, TokenKind};

use crate::cursor::Cursor;
use crate::error::Fault;
use crate::tag::TextContent;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
/// The numeric, named and ambiguous-ampersand reference states are folded into
/// one subroutine invoked from the two `CharacterReferenceIn*` states and the
/// attribute value states.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// with the data state as return state.
    CharacterReferenceInData,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// Character reference state returning to RCDATA.
    CharacterReferenceInRCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    PLAINTEXT,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    RCDATALessThanSign,
    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    RCDATAEndTagOpen,
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    RCDATAEndTagName,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RAWTEXTLessThanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RAWTEXTEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RAWTEXTEndTagName,
    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    ScriptDataLessThanSign,
    /// [§ 13.2.5.16 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    ScriptDataEndTagOpen,
    /// [§ 13.2.5.17 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    ScriptDataEndTagName,
    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    ScriptDataEscapeStart,
    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    ScriptDataEscapeStartDash,
    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    ScriptDataEscaped,
    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    ScriptDataEscapedDash,
    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    ScriptDataEscapedDashDash,
    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    ScriptDataEscapedLessThanSign,
    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    ScriptDataEscapedEndTagOpen,
    /// [§ 13.2.5.25 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    ScriptDataEscapedEndTagName,
    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    ScriptDataDoubleEscapeStart,
    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    ScriptDataDoubleEscaped,
    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    ScriptDataDoubleEscapedDash,
    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    ScriptDataDoubleEscapedDashDash,
    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    ScriptDataDoubleEscapedLessThanSign,
    /// [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    ScriptDataDoubleEscapeEnd,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    CommentLessThanSign,
    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    CommentLessThanSignBang,
    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    CommentLessThanSignBangDash,
    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    CommentLessThanSignBangDashDash,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    DOCTYPE,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDOCTYPEName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DOCTYPEName,
    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    AfterDOCTYPEName,
    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    AfterDOCTYPEPublicKeyword,
    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    BeforeDOCTYPEPublicIdentifier,
    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    DOCTYPEPublicIdentifierDoubleQuoted,
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    DOCTYPEPublicIdentifierSingleQuoted,
    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    AfterDOCTYPEPublicIdentifier,
    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    BetweenDOCTYPEPublicAndSystemIdentifiers,
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    AfterDOCTYPESystemKeyword,
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    BeforeDOCTYPESystemIdentifier,
    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    DOCTYPESystemIdentifierDoubleQuoted,
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    DOCTYPESystemIdentifierSingleQuoted,
    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    AfterDOCTYPESystemIdentifier,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    BogusDOCTYPE,
    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    /// (the bracket and end states are folded in).
    CDATASection,
}

/// A state handler. Runs one step and either buffers characters, changes
/// state, or emits the pending token.
type StateHandler = fn(&mut Tokenizer) -> Result<(), Fault>;

impl TokenizerState {
    /// The function that implements this state.
    fn handler(self) -> StateHandler {
        match self {
            Self::Data => Tokenizer::handle_data_state,
            Self::CharacterReferenceInData => Tokenizer::handle_character_reference_in_data_state,
            Self::RCDATA => Tokenizer::handle_rcdata_state,
            Self::CharacterReferenceInRCDATA => {
                Tokenizer::handle_character_reference_in_rcdata_state
            }
            Self::RAWTEXT => Tokenizer::handle_rawtext_state,
            Self::ScriptData => Tokenizer::handle_script_data_state,
            Self::PLAINTEXT => Tokenizer::handle_plaintext_state,
            Self::TagOpen => Tokenizer::handle_tag_open_state,
            Self::EndTagOpen => Tokenizer::handle_end_tag_open_state,
            Self::TagName => Tokenizer::handle_tag_name_state,
            Self::RCDATALessThanSign => Tokenizer::handle_rcdata_less_than_sign_state,
            Self::RCDATAEndTagOpen => Tokenizer::handle_rcdata_end_tag_open_state,
            Self::RCDATAEndTagName => Tokenizer::handle_rcdata_end_tag_name_state,
            Self::RAWTEXTLessThanSign => Tokenizer::handle_rawtext_less_than_sign_state,
            Self::RAWTEXTEndTagOpen => Tokenizer::handle_rawtext_end_tag_open_state,
            Self::RAWTEXTEndTagName => Tokenizer::handle_rawtext_end_tag_name_state,
            Self::ScriptDataLessThanSign => Tokenizer::handle_script_data_less_than_sign_state,
            Self::ScriptDataEndTagOpen => Tokenizer::handle_script_data_end_tag_open_state,
            Self::ScriptDataEndTagName => Tokenizer::handle_script_data_end_tag_name_state,
            Self::ScriptDataEscapeStart => Tokenizer::handle_script_data_escape_start_state,
            Self::ScriptDataEscapeStartDash => {
                Tokenizer::handle_script_data_escape_start_dash_state
            }
            Self::ScriptDataEscaped => Tokenizer::handle_script_data_escaped_state,
            Self::ScriptDataEscapedDash => Tokenizer::handle_script_data_escaped_dash_state,
            Self::ScriptDataEscapedDashDash => {
                Tokenizer::handle_script_data_escaped_dash_dash_state
            }
            Self::ScriptDataEscapedLessThanSign => {
                Tokenizer::handle_script_data_escaped_less_than_sign_state
            }
            Self::ScriptDataEscapedEndTagOpen => {
                Tokenizer::handle_script_data_escaped_end_tag_open_state
            }
            Self::ScriptDataEscapedEndTagName => {
                Tokenizer::handle_script_data_escaped_end_tag_name_state
            }
            Self::ScriptDataDoubleEscapeStart => {
                Tokenizer::handle_script_data_double_escape_start_state
            }
            Self::ScriptDataDoubleEscaped => Tokenizer::handle_script_data_double_escaped_state,
            Self::ScriptDataDoubleEscapedDash => {
                Tokenizer::handle_script_data_double_escaped_dash_state
            }
            Self::ScriptDataDoubleEscapedDashDash => {
                Tokenizer::handle_script_data_double_escaped_dash_dash_state
            }
            Self::ScriptDataDoubleEscapedLessThanSign => {
                Tokenizer::handle_script_data_double_escaped_less_than_sign_state
            }
            Self::ScriptDataDoubleEscapeEnd => {
                Tokenizer::handle_script_data_double_escape_end_state
            }
            Self::BeforeAttributeName => Tokenizer::handle_before_attribute_name_state,
            Self::AttributeName => Tokenizer::handle_attribute_name_state,
            Self::AfterAttributeName => Tokenizer::handle_after_attribute_name_state,
            Self::BeforeAttributeValue => Tokenizer::handle_before_attribute_value_state,
            Self::AttributeValueDoubleQuoted => {
                Tokenizer::handle_attribute_value_double_quoted_state
            }
            Self::AttributeValueSingleQuoted => {
                Tokenizer::handle_attribute_value_single_quoted_state
            }
            Self::AttributeValueUnquoted => Tokenizer::handle_attribute_value_unquoted_state,
            Self::AfterAttributeValueQuoted => {
                Tokenizer::handle_after_attribute_value_quoted_state
            }
            Self::SelfClosingStartTag => Tokenizer::handle_self_closing_start_tag_state,
            Self::BogusComment => Tokenizer::handle_bogus_comment_state,
            Self::MarkupDeclarationOpen => Tokenizer::handle_markup_declaration_open_state,
            Self::CommentStart => Tokenizer::handle_comment_start_state,
            Self::CommentStartDash => Tokenizer::handle_comment_start_dash_state,
            Self::Comment => Tokenizer::handle_comment_state,
            Self::CommentLessThanSign => Tokenizer::handle_comment_less_than_sign_state,
            Self::CommentLessThanSignBang => Tokenizer::handle_comment_less_than_sign_bang_state,
            Self::CommentLessThanSignBangDash => {
                Tokenizer::handle_comment_less_than_sign_bang_dash_state
            }
            Self::CommentLessThanSignBangDashDash => {
                Tokenizer::handle_comment_less_than_sign_bang_dash_dash_state
            }
            Self::CommentEndDash => Tokenizer::handle_comment_end_dash_state,
            Self::CommentEnd => Tokenizer::handle_comment_end_state,
            Self::CommentEndBang => Tokenizer::handle_comment_end_bang_state,
            Self::DOCTYPE => Tokenizer::handle_doctype_state,
            Self::BeforeDOCTYPEName => Tokenizer::handle_before_doctype_name_state,
            Self::DOCTYPEName => Tokenizer::handle_doctype_name_state,
            Self::AfterDOCTYPEName => Tokenizer::handle_after_doctype_name_state,
            Self::AfterDOCTYPEPublicKeyword => {
                Tokenizer::handle_after_doctype_public_keyword_state
            }
            Self::BeforeDOCTYPEPublicIdentifier => {
                Tokenizer::handle_before_doctype_public_identifier_state
            }
            Self::DOCTYPEPublicIdentifierDoubleQuoted => {
                Tokenizer::handle_doctype_public_identifier_double_quoted_state
            }
            Self::DOCTYPEPublicIdentifierSingleQuoted => {
                Tokenizer::handle_doctype_public_identifier_single_quoted_state
            }
            Self::AfterDOCTYPEPublicIdentifier => {
                Tokenizer::handle_after_doctype_public_identifier_state
            }
            Self::BetweenDOCTYPEPublicAndSystemIdentifiers => {
                Tokenizer::handle_between_doctype_public_and_system_identifiers_state
            }
            Self::AfterDOCTYPESystemKeyword => {
                Tokenizer::handle_after_doctype_system_keyword_state
            }
            Self::BeforeDOCTYPESystemIdentifier => {
                Tokenizer::handle_before_doctype_system_identifier_state
            }
            Self::DOCTYPESystemIdentifierDoubleQuoted => {
                Tokenizer::handle_doctype_system_identifier_double_quoted_state
            }
            Self::DOCTYPESystemIdentifierSingleQuoted => {
                Tokenizer::handle_doctype_system_identifier_single_quoted_state
            }
            Self::AfterDOCTYPESystemIdentifier => {
                Tokenizer::handle_after_doctype_system_identifier_state
            }
            Self::BogusDOCTYPE => Tokenizer::handle_bogus_doctype_state,
            Self::CDATASection => Tokenizer::handle_cdata_section_state,
        }
    }
}

impl From<TextContent> for TokenizerState {
    fn from(kind: TextContent) -> Self {
        match kind {
            TextContent::Rcdata => Self::RCDATA,
            TextContent::Rawtext => Self::RAWTEXT,
            TextContent::ScriptData => Self::ScriptData,
            TextContent::Plaintext => Self::PLAINTEXT,
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// One token is in flight at a time: [`Tokenizer::read`] moves it out and
/// [`Tokenizer::recycle`] must hand it back before the next read.
#[derive(Debug)]
pub struct Tokenizer {
    pub(super) cursor: Cursor,
    pub(super) state: TokenizerState,
    pub(super) errors: ParseErrorList,

    /// The token waiting to be handed out, behind any buffered characters.
    pending: Option<Token>,
    /// Set between `read()` and `recycle()`.
    checked_out: bool,

    /// Tag under construction; `tag_is_start` says which kind it becomes.
    pub(super) tag: Tag,
    pub(super) tag_is_start: bool,
    pub(super) comment: Comment,
    pub(super) doctype: Doctype,

    /// Coalesced character data, handed out ahead of the pending token.
    pub(super) char_buffer: String,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    /// "The temporary buffer is used to temporarily store characters during certain
    /// tokenization operations, particularly for end tag detection in RCDATA/RAWTEXT states."
    pub(super) temporary_buffer: String,

    /// "The last start tag token emitted is used as part of the tree construction stage
    /// and in the RCDATA, RAWTEXT, and script data states."
    pub(super) last_start_tag_name: String,

    self_closing_acknowledged: bool,
}

impl Tokenizer {
    /// Create a tokenizer over `input` that does not record diagnostics.
    pub fn new(input: impl Into<String>) -> Self {
        Self::with_errors(Cursor::new(input), ParseErrorList::no_tracking())
    }

    /// Create a tokenizer over a cursor, recording diagnostics into `errors`.
    ///
    /// "The tokenizer state machine consists of the states defined in the
    /// following subsections. The initial state is the data state."
    #[must_use]
    pub fn with_errors(cursor: Cursor, errors: ParseErrorList) -> Self {
        Self {
            cursor,
            state: TokenizerState::Data,
            errors,
            pending: None,
            checked_out: false,
            tag: Tag::default(),
            tag_is_start: true,
            comment: Comment::default(),
            doctype: Doctype::default(),
            char_buffer: String::new(),
            temporary_buffer: String::new(),
            last_start_tag_name: String::new(),
            self_closing_acknowledged: true,
        }
    }

    /// Run states until one token is ready and hand it out.
    ///
    /// Buffered characters come out first as one [`Characters`] run. After
    /// [`Token::EndOfInput`] every further read returns `EndOfInput` again.
    ///
    /// # Errors
    ///
    /// [`Fault::TokenNotReturned`] if the previous token has not been passed
    /// to [`Tokenizer::recycle`].
    pub fn read(&mut self) -> Result<Token, Fault> {
        if self.checked_out {
            return Err(Fault::TokenNotReturned);
        }
        if !self.self_closing_acknowledged {
            self.error("self-closing flag not acknowledged");
            self.self_closing_acknowledged = true;
        }

        while self.pending.is_none() {
            let step = self.state.handler();
            step(self)?;
        }

        let token = if self.char_buffer.is_empty() {
            self.pending
                .take()
                .ok_or(Fault::Unreachable("pending token vanished"))?
        } else {
            Token::Characters(Characters {
                data: mem::take(&mut self.char_buffer),
                cdata: false,
            })
        };

        if let Token::StartTag(tag) = &token
            && tag.self_closing
        {
            self.self_closing_acknowledged = false;
        }
        self.checked_out = true;
        log::trace!(target: "thicket::tokenizer", "read {token}");
        Ok(token)
    }

    /// Return a token from [`Tokenizer::read`] so its buffers are reused.
    pub fn recycle(&mut self, token: Token) {
        self.checked_out = false;
        match token {
            Token::StartTag(mut tag) | Token::EndTag(mut tag) => {
                tag.reset();
                self.tag = tag;
            }
            Token::Comment(mut comment) => {
                comment.reset();
                self.comment = comment;
            }
            Token::Doctype(mut doctype) => {
                doctype.reset();
                self.doctype = doctype;
            }
            Token::Characters(Characters { mut data, .. }) => {
                if self.char_buffer.is_empty() && data.capacity() > self.char_buffer.capacity() {
                    data.clear();
                    self.char_buffer = data;
                }
            }
            Token::EndOfInput => {}
        }
    }

    /// Acknowledge the self-closing flag of the start tag just read.
    ///
    /// Without this the next [`Tokenizer::read`] records a diagnostic.
    pub const fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// Switch to `state`. Tree builders use this after start tags whose
    /// content is not markup.
    pub fn transition(&mut self, state: TokenizerState) {
        log::trace!(target: "thicket::tokenizer", "{} -> {state}", self.state);
        self.state = state;
    }

    /// Switch to the text state a tag's content requires.
    pub fn enter_text_content(&mut self, kind: TextContent) {
        self.transition(kind.into());
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Current byte offset into the input.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub const fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    /// Record a diagnostic at the current position on behalf of a consumer.
    pub fn report(&mut self, message: impl std::fmt::Display) {
        self.error(message);
    }

    /// Take the recorded diagnostics, leaving an empty list with the same bound.
    pub fn take_errors(&mut self) -> ParseErrorList {
        let bound = ParseErrorList::tracking(self.errors.max_size());
        mem::replace(&mut self.errors, bound)
    }

    /// Normalized name of the last start tag emitted.
    #[must_use]
    pub fn last_start_tag_name(&self) -> &str {
        &self.last_start_tag_name
    }

    /// Decode every character reference in the remaining input.
    ///
    /// Used for plain strings rather than markup: `<` has no meaning here.
    pub fn unescape_entities(&mut self, in_attribute: bool) -> Result<String, Fault> {
        let mut out = String::with_capacity(self.cursor.len());
        while !self.cursor.is_empty() {
            out.push_str(self.cursor.consume_to(b'&'));
            if self.cursor.matches('&') {
                self.cursor.advance();
                match self.consume_character_reference(None, in_attribute)? {
                    Some(reference) => reference.push_to(&mut out),
                    None => out.push('&'),
                }
            }
        }
        Ok(out)
    }
}
