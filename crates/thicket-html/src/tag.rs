//! Static metadata about known HTML tags.
//!
//! The tree builders ask this table whether an element is void (never pushed
//! onto the stack of open elements) and the tokenizer's consumers ask which
//! text state an element's content needs.

use std::collections::HashMap;
use std::sync::LazyLock;

use strum_macros::Display;

/// How the content of an element is tokenized.
///
/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#elements-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TextContent {
    /// "Escapable raw text elements": character references decoded, no tags.
    Rcdata,
    /// "Raw text elements": taken verbatim up to the matching end tag.
    Rawtext,
    /// `script`: raw text with the comment-like escaping rules.
    ScriptData,
    /// `plaintext`: everything to the end of input.
    Plaintext,
}

/// What the parser knows about one tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Normalized (lowercase) tag name.
    pub name: &'static str,
    /// Block level rather than inline.
    pub is_block: bool,
    /// Block level but its children format inline (`p`, `li`, headings).
    pub format_as_inline: bool,
    /// Void element: no content and no end tag.
    pub is_void: bool,
    /// Whitespace inside is significant.
    pub preserve_whitespace: bool,
    /// Form-associated listed element.
    pub form_listed: bool,
    /// Form-associated submittable element.
    pub form_submittable: bool,
    /// Tokenizer state the content requires, if not plain data.
    pub text_content: Option<TextContent>,
}

impl TagInfo {
    const fn new(name: &'static str, is_block: bool) -> Self {
        Self {
            name,
            is_block,
            format_as_inline: false,
            is_void: false,
            preserve_whitespace: false,
            form_listed: false,
            form_submittable: false,
            text_content: None,
        }
    }

    /// Metadata for a normalized tag name; `None` for unknown tags.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Self> {
        TAGS.get(name)
    }

    /// Whether `name` is a void element.
    #[must_use]
    pub fn is_void_element(name: &str) -> bool {
        Self::lookup(name).is_some_and(|t| t.is_void)
    }

    /// Text state needed by the content of `name`.
    #[must_use]
    pub fn text_content_of(name: &str) -> Option<TextContent> {
        Self::lookup(name).and_then(|t| t.text_content)
    }

    /// Inline rather than block level.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        !self.is_block
    }
}

const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1",
    "h2", "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address",
    "figure", "figcaption", "form", "fieldset", "ins", "del", "dl", "dt", "dd", "li", "table",
    "caption", "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio",
    "canvas", "details", "menu", "plaintext", "template", "article", "main", "search", "svg",
    "math", "center", "dir", "applet", "marquee", "listing",
];

const INLINE_TAGS: &[&str] = &[
    "object", "base", "font", "tt", "i", "b", "u", "big", "small", "em", "strong", "dfn", "code",
    "samp", "kbd", "var", "cite", "abbr", "time", "acronym", "mark", "ruby", "rt", "rp", "rtc",
    "rb", "a", "img", "br", "wbr", "map", "q", "sub", "sup", "bdo", "iframe", "embed", "span",
    "input", "select", "textarea", "label", "button", "optgroup", "option", "legend", "datalist",
    "keygen", "output", "progress", "meter", "area", "param", "source", "track", "summary",
    "command", "basefont", "bgsound", "menuitem", "data", "bdi", "s", "strike", "nobr", "xmp",
    "noembed", "image",
];

const VOID_TAGS: &[&str] = &[
    "meta", "link", "base", "frame", "img", "br", "wbr", "embed", "hr", "input", "keygen", "col",
    "command", "area", "basefont", "bgsound", "menuitem", "param", "source", "track",
];

const FORMAT_AS_INLINE_TAGS: &[&str] = &[
    "title", "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "address", "li", "th", "td",
    "script", "style", "ins", "del", "s", "button",
];

const PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "plaintext", "title", "textarea", "listing"];

const FORM_LISTED_TAGS: &[&str] = &[
    "button", "fieldset", "input", "keygen", "object", "output", "select", "textarea",
];

const FORM_SUBMIT_TAGS: &[&str] = &["input", "keygen", "object", "select", "textarea"];

const TEXT_CONTENT_TAGS: &[(&str, TextContent)] = &[
    ("title", TextContent::Rcdata),
    ("textarea", TextContent::Rcdata),
    ("style", TextContent::Rawtext),
    ("xmp", TextContent::Rawtext),
    ("iframe", TextContent::Rawtext),
    ("noembed", TextContent::Rawtext),
    ("noframes", TextContent::Rawtext),
    ("script", TextContent::ScriptData),
    ("plaintext", TextContent::Plaintext),
];

static TAGS: LazyLock<HashMap<&'static str, TagInfo>> = LazyLock::new(|| {
    let mut tags = HashMap::with_capacity(BLOCK_TAGS.len() + INLINE_TAGS.len());
    for &name in BLOCK_TAGS {
        let _ = tags.insert(name, TagInfo::new(name, true));
    }
    for &name in INLINE_TAGS {
        let _ = tags.entry(name).or_insert_with(|| TagInfo::new(name, false));
    }

    let mut update = |names: &[&'static str], apply: fn(&mut TagInfo)| {
        for name in names {
            if let Some(info) = tags.get_mut(name) {
                apply(info);
            }
        }
    };
    update(VOID_TAGS, |t| t.is_void = true);
    update(FORMAT_AS_INLINE_TAGS, |t| t.format_as_inline = true);
    update(PRESERVE_WHITESPACE_TAGS, |t| t.preserve_whitespace = true);
    update(FORM_LISTED_TAGS, |t| t.form_listed = true);
    update(FORM_SUBMIT_TAGS, |t| t.form_submittable = true);

    for &(name, kind) in TEXT_CONTENT_TAGS {
        if let Some(info) = tags.get_mut(name) {
            info.text_content = Some(kind);
        }
    }
    tags
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        for name in ["br", "img", "input", "meta", "hr", "col"] {
            assert!(TagInfo::is_void_element(name), "{name} should be void");
        }
        assert!(!TagInfo::is_void_element("div"));
        assert!(!TagInfo::is_void_element("custom-element"));
    }

    #[test]
    fn test_text_content_kinds() {
        assert_eq!(TagInfo::text_content_of("title"), Some(TextContent::Rcdata));
        assert_eq!(TagInfo::text_content_of("style"), Some(TextContent::Rawtext));
        assert_eq!(TagInfo::text_content_of("script"), Some(TextContent::ScriptData));
        assert_eq!(TagInfo::text_content_of("plaintext"), Some(TextContent::Plaintext));
        assert_eq!(TagInfo::text_content_of("p"), None);
    }

    #[test]
    fn test_block_and_inline() {
        let div = TagInfo::lookup("div").unwrap();
        assert!(div.is_block);
        let span = TagInfo::lookup("span").unwrap();
        assert!(span.is_inline());
        let p = TagInfo::lookup("p").unwrap();
        assert!(p.is_block && p.format_as_inline);
        assert!(TagInfo::lookup("textarea").unwrap().form_submittable);
        assert!(TagInfo::lookup("pre").unwrap().preserve_whitespace);
    }
}
