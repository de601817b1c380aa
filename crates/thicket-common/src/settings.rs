//! Case folding policy for tag and attribute names.

use std::borrow::Cow;

/// Controls whether tag and attribute names keep the case they were written in.
///
/// HTML folds both to ASCII lowercase; XML keeps both verbatim. The two
/// switches are independent, so an HTML parse can keep attribute case while
/// still folding tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseSettings {
    preserve_tag_case: bool,
    preserve_attribute_case: bool,
}

impl ParseSettings {
    /// HTML defaults: tag and attribute names are folded to lowercase.
    pub const HTML_DEFAULT: Self = Self::new(false, false);

    /// XML defaults: tag and attribute names are kept as written.
    pub const PRESERVE_CASE: Self = Self::new(true, true);

    /// Create settings with explicit case preservation flags.
    #[must_use]
    pub const fn new(preserve_tag_case: bool, preserve_attribute_case: bool) -> Self {
        Self {
            preserve_tag_case,
            preserve_attribute_case,
        }
    }

    /// Whether tag names keep their original case.
    #[must_use]
    pub const fn preserve_tag_case(&self) -> bool {
        self.preserve_tag_case
    }

    /// Whether attribute names keep their original case.
    #[must_use]
    pub const fn preserve_attribute_case(&self) -> bool {
        self.preserve_attribute_case
    }

    /// Normalize a tag name according to this policy.
    ///
    /// Surrounding whitespace is never significant in a tag name and is
    /// trimmed in both modes.
    #[must_use]
    pub fn normalize_tag<'a>(&self, name: &'a str) -> Cow<'a, str> {
        fold(name.trim(), self.preserve_tag_case)
    }

    /// Normalize an attribute name according to this policy.
    #[must_use]
    pub fn normalize_attribute<'a>(&self, name: &'a str) -> Cow<'a, str> {
        fold(name.trim(), self.preserve_attribute_case)
    }
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self::HTML_DEFAULT
    }
}

fn fold(name: &str, preserve: bool) -> Cow<'_, str> {
    if preserve || !name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_default_folds_both() {
        let settings = ParseSettings::HTML_DEFAULT;
        assert_eq!(settings.normalize_tag("DiV"), "div");
        assert_eq!(settings.normalize_attribute(" HREF "), "href");
    }

    #[test]
    fn test_preserve_case_keeps_names() {
        let settings = ParseSettings::PRESERVE_CASE;
        assert_eq!(settings.normalize_tag("svgPath"), "svgPath");
        assert_eq!(settings.normalize_attribute("viewBox"), "viewBox");
    }

    #[test]
    fn test_independent_switches() {
        let settings = ParseSettings::new(false, true);
        assert_eq!(settings.normalize_tag("P"), "p");
        assert_eq!(settings.normalize_attribute("dataX"), "dataX");
    }

    #[test]
    fn test_lowercase_name_is_borrowed() {
        let settings = ParseSettings::HTML_DEFAULT;
        assert!(matches!(settings.normalize_tag("span"), Cow::Borrowed(_)));
    }
}
