use std::fmt;
use std::mem;

use strum_macros::{Display, EnumDiscriminants};
use thicket_dom::{Attribute, Attributes};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Adjacent characters are delivered as one [`Characters`] run. Every variant
/// owns its buffers; handing a token back through
/// [`Tokenizer::recycle`](super::Tokenizer::recycle) lets the next token of the
/// same kind reuse them.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(TokenKind), derive(Display, Hash))]
pub enum Token {
    /// `<!DOCTYPE ...>`
    Doctype(Doctype),
    /// `<name attrs>`
    StartTag(Tag),
    /// `</name>`
    EndTag(Tag),
    /// `<!-- ... -->` or a bogus comment.
    Comment(Comment),
    /// A run of text.
    Characters(Characters),
    /// End of input. Repeats if read again.
    EndOfInput,
}

impl Token {
    /// Which kind of token this is.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        TokenKind::from(self)
    }

    /// Returns true if this is an end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// The start tag, if this is one.
    #[must_use]
    pub const fn as_start_tag(&self) -> Option<&Tag> {
        match self {
            Self::StartTag(tag) => Some(tag),
            _ => None,
        }
    }

    /// The end tag, if this is one.
    #[must_use]
    pub const fn as_end_tag(&self) -> Option<&Tag> {
        match self {
            Self::EndTag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Whether this is a start tag with the given normalized name.
    #[must_use]
    pub fn is_start_tag_named(&self, name: &str) -> bool {
        self.as_start_tag().is_some_and(|t| t.normal_name() == name)
    }

    /// Whether this is an end tag with the given normalized name.
    #[must_use]
    pub fn is_end_tag_named(&self, name: &str) -> bool {
        self.as_end_tag().is_some_and(|t| t.normal_name() == name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype(doctype) => write!(f, "{doctype}"),
            Self::StartTag(tag) => {
                write!(f, "<{}", tag.name)?;
                for attr in &tag.attributes {
                    write!(f, " {attr}")?;
                }
                if tag.self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag(tag) => write!(f, "</{}>", tag.name),
            Self::Comment(comment) => write!(f, "<!--{}-->", comment.data),
            Self::Characters(chars) if chars.cdata => write!(f, "<![CDATA[{}]]>", chars.data),
            Self::Characters(chars) => write!(f, "{:?}", chars.data),
            Self::EndOfInput => write!(f, "EOF"),
        }
    }
}

/// "Start and end tag tokens have a tag name, a self-closing flag, and a
/// list of attributes, each of which has a name and a value."
///
/// The attribute currently being read lives in the pending name and value
/// buffers until the tokenizer reaches the next attribute boundary, at which
/// point it is flushed into [`Tag::attributes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Tag name as written.
    pub name: String,
    normal_name: String,
    /// "a self-closing flag"
    pub self_closing: bool,
    /// Attributes in source order, names as written, duplicates removed.
    pub attributes: Attributes,
    pending_attribute_name: String,
    pending_attribute_value: String,
    has_pending_attribute: bool,
}

impl Tag {
    /// A tag with the given name and nothing else, for synthesized tokens.
    pub fn named(name: &str) -> Self {
        let mut tag = Self::default();
        tag.append_name(name);
        tag
    }

    /// Return to the blank state, keeping allocations.
    pub fn reset(&mut self) {
        self.name.clear();
        self.normal_name.clear();
        self.self_closing = false;
        self.attributes.clear();
        self.pending_attribute_name.clear();
        self.pending_attribute_value.clear();
        self.has_pending_attribute = false;
    }

    /// The tag name folded to ASCII lowercase.
    #[must_use]
    pub fn normal_name(&self) -> &str {
        &self.normal_name
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub fn append_name(&mut self, text: &str) {
        self.name.push_str(text);
        self.normal_name
            .extend(text.chars().map(|c| c.to_ascii_lowercase()));
    }

    /// Single character form of [`Tag::append_name`].
    pub fn append_name_char(&mut self, c: char) {
        self.name.push(c);
        self.normal_name.push(c.to_ascii_lowercase());
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token."
    ///
    /// Flushes the attribute read so far. Returns the name of that attribute
    /// if it had to be dropped as a duplicate.
    pub fn new_attribute(&mut self) -> Option<String> {
        let dropped = self.flush_pending_attribute();
        self.has_pending_attribute = true;
        dropped
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "Append the current input character to the current attribute's name."
    pub fn append_attribute_name(&mut self, text: &str) {
        self.has_pending_attribute = true;
        self.pending_attribute_name.push_str(text);
    }

    /// Single character form of [`Tag::append_attribute_name`].
    pub fn append_attribute_name_char(&mut self, c: char) {
        self.has_pending_attribute = true;
        self.pending_attribute_name.push(c);
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    ///
    /// "Append the current input character to the current attribute's value."
    pub fn append_attribute_value(&mut self, text: &str) {
        self.pending_attribute_value.push_str(text);
    }

    /// Single character form of [`Tag::append_attribute_value`].
    pub fn append_attribute_value_char(&mut self, c: char) {
        self.pending_attribute_value.push(c);
    }

    /// Flush the pending attribute into the list. Called before the tag is
    /// emitted. Returns the name of a dropped duplicate, if any.
    ///
    /// "If there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    pub fn finalize(&mut self) -> Option<String> {
        self.flush_pending_attribute()
    }

    fn flush_pending_attribute(&mut self) -> Option<String> {
        if !mem::take(&mut self.has_pending_attribute) {
            return None;
        }
        let name = mem::take(&mut self.pending_attribute_name);
        let value = mem::take(&mut self.pending_attribute_value);
        if name.is_empty() {
            return None;
        }
        if self.attributes.contains(&name) {
            return Some(name);
        }
        self.attributes.push(Attribute { name, value });
        None
    }
}

/// "Comment and character tokens have data."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Text between the delimiters.
    pub data: String,
    /// Set for markup that only looked like a declaration (`<!x>`, `<?x?>`).
    ///
    /// The data of a bogus comment starts with the `!` or `?` that opened it.
    pub bogus: bool,
}

impl Comment {
    /// Return to the blank state, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
        self.bogus = false;
    }
}

/// A run of character data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characters {
    /// The text, with character references already decoded.
    pub data: String,
    /// Set when the text came from a `<![CDATA[...]]>` section.
    pub cdata: bool,
}

impl Characters {
    /// Return to the blank state, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
        self.cdata = false;
    }
}

/// `PUBLIC` or `SYSTEM` in a doctype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DoctypeKeyword {
    /// `PUBLIC`
    #[strum(serialize = "PUBLIC")]
    Public,
    /// `SYSTEM`
    #[strum(serialize = "SYSTEM")]
    System,
}

/// "DOCTYPE tokens have a name, a public identifier, a system identifier,
/// and a force-quirks flag. When a DOCTYPE token is created, its name,
/// public identifier, and system identifier must be marked as missing
/// (which is a distinct state from the empty string), and the force-quirks
/// flag must be set to off (its other state is on)."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doctype {
    /// "a name", as written.
    pub name: Option<String>,
    /// Keyword that introduced the identifiers.
    pub pub_sys_key: Option<DoctypeKeyword>,
    /// "a public identifier"
    pub public_identifier: Option<String>,
    /// "a system identifier"
    pub system_identifier: Option<String>,
    /// "a force-quirks flag"
    pub force_quirks: bool,
}

impl Doctype {
    /// Return to the blank state.
    pub fn reset(&mut self) {
        self.name = None;
        self.pub_sys_key = None;
        self.public_identifier = None;
        self.system_identifier = None;
        self.force_quirks = false;
    }

    pub(super) fn name_mut(&mut self) -> &mut String {
        self.name.get_or_insert_with(String::new)
    }

    pub(super) fn public_identifier_mut(&mut self) -> &mut String {
        self.public_identifier.get_or_insert_with(String::new)
    }

    pub(super) fn system_identifier_mut(&mut self) -> &mut String {
        self.system_identifier.get_or_insert_with(String::new)
    }
}

impl fmt::Display for Doctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!DOCTYPE")?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(key) = self.pub_sys_key {
            write!(f, " {key}")?;
        }
        if let Some(public) = &self.public_identifier {
            write!(f, " \"{public}\"")?;
        }
        if let Some(system) = &self.system_identifier {
            write!(f, " \"{system}\"")?;
        }
        if self.force_quirks {
            write!(f, " (force-quirks)")?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_normal_name_tracks_raw_name() {
        let mut tag = Tag::default();
        tag.append_name("DiV");
        tag.append_name_char('X');
        assert_eq!(tag.name, "DiVX");
        assert_eq!(tag.normal_name(), "divx");
    }

    #[test]
    fn test_attributes_flush_on_boundaries() {
        let mut tag = Tag::named("a");
        assert_eq!(tag.new_attribute(), None);
        tag.append_attribute_name("href");
        tag.append_attribute_value("/x");
        assert_eq!(tag.new_attribute(), None);
        tag.append_attribute_name("HREF");
        assert_eq!(tag.new_attribute(), None);
        tag.append_attribute_name("href");
        tag.append_attribute_value("dup");
        assert_eq!(tag.finalize(), Some("href".to_string()));

        let names: Vec<_> = tag.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["href", "HREF"]);
        assert_eq!(tag.attributes.get("href"), Some("/x"));
        assert_eq!(tag.attributes.get("HREF"), Some(""));
    }

    #[test]
    fn test_reset_leaves_no_residue() {
        let mut tag = Tag::named("p");
        tag.self_closing = true;
        let _ = tag.new_attribute();
        tag.append_attribute_name("half");
        tag.reset();
        assert_eq!(tag, Tag::default());

        let mut doctype = Doctype::default();
        doctype.name_mut().push_str("html");
        doctype.force_quirks = true;
        doctype.reset();
        assert_eq!(doctype, Doctype::default());
    }

    #[test]
    fn test_token_display() {
        let mut tag = Tag::named("img");
        let _ = tag.new_attribute();
        tag.append_attribute_name("src");
        tag.append_attribute_value("a.png");
        let _ = tag.finalize();
        tag.self_closing = true;
        assert_eq!(Token::StartTag(tag).to_string(), "<img src=\"a.png\" />");
        assert_eq!(Token::EndOfInput.kind(), TokenKind::EndOfInput);
    }
}
