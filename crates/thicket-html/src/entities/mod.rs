//! Named character reference lookup table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! The full list of 2,125 names (2,231 counting the semicolon-less legacy
//! spellings). The table is immutable static data and safe to share between
//! parses running on different threads.
//!
//! NOTE: Some references decode to two code points (e.g. `NotEqualTilde`
//! becomes U+2242 U+0338), so values are strings rather than chars.

mod table;

use std::collections::HashMap;
use std::sync::LazyLock;

use table::ENTITIES;

/// Longest name that is recognized without a trailing semicolon (`frac12`).
const MAX_LEGACY_NAME_LEN: usize = 6;

fn find(name: &str) -> Option<&'static (&'static str, &'static str, bool)> {
    ENTITIES
        .binary_search_by(|(candidate, _, _)| candidate.cmp(&name))
        .ok()
        .map(|index| &ENTITIES[index])
}

/// Decoded text for `name` (given without `&` or `;`).
///
/// # Example
/// ```
/// assert_eq!(thicket_html::entities::lookup("amp"), Some("&"));
/// assert_eq!(thicket_html::entities::lookup("nope"), None);
/// ```
#[must_use]
pub fn lookup(name: &str) -> Option<&'static str> {
    find(name).map(|(_, value, _)| *value)
}

/// Whether `name` is a known reference.
#[must_use]
pub fn is_named(name: &str) -> bool {
    find(name).is_some()
}

/// Whether `name` may appear without its terminating semicolon.
#[must_use]
pub fn is_legacy(name: &str) -> bool {
    find(name).is_some_and(|(_, _, legacy)| *legacy)
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// "Consume the maximum number of characters possible, where the consumed
/// characters are one of the identifiers in the named character references
/// table."
///
/// Only the legacy names can match without a semicolon, so this returns the
/// longest legacy name that `candidate` starts with, and its value.
#[must_use]
pub fn longest_legacy_prefix(candidate: &str) -> Option<(&'static str, &'static str)> {
    let longest = candidate.len().min(MAX_LEGACY_NAME_LEN);
    (1..=longest).rev().find_map(|len| {
        let prefix = candidate.get(..len)?;
        match find(prefix)? {
            (name, value, true) => Some((*name, *value)),
            _ => None,
        }
    })
}

/// Preferred name for each decoded value: the shortest, favoring lowercase.
static BY_VALUE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let preference = |name: &str| (name.len(), name.bytes().any(|b| b.is_ascii_uppercase()));
    let mut by_value: HashMap<&'static str, &'static str> = HashMap::with_capacity(ENTITIES.len());
    for &(name, value, _) in ENTITIES {
        let _ = by_value
            .entry(value)
            .and_modify(|current| {
                if (preference(name), name) < (preference(current), *current) {
                    *current = name;
                }
            })
            .or_insert(name);
    }
    by_value
});

/// Reverse lookup: a name that decodes to `value`.
///
/// # Example
/// ```
/// assert_eq!(thicket_html::entities::name_for("&"), Some("amp"));
/// assert_eq!(thicket_html::entities::name_for("\u{a9}"), Some("copy"));
/// ```
#[must_use]
pub fn name_for(value: &str) -> Option<&'static str> {
    BY_VALUE.get(value).copied()
}

/// Reverse lookup for a single code point.
#[must_use]
pub fn name_for_char(c: char) -> Option<&'static str> {
    let mut buf = [0; 4];
    name_for(c.encode_utf8(&mut buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(ENTITIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_lookup_common() {
        assert_eq!(lookup("lt"), Some("<"));
        assert_eq!(lookup("copy"), Some("\u{a9}"));
        assert_eq!(lookup("NotEqualTilde"), Some("\u{2242}\u{338}"));
        assert!(is_named("fjlig"));
        assert!(!is_named("AMP;"));
    }

    #[test]
    fn test_legacy_prefix() {
        assert_eq!(longest_legacy_prefix("notit"), Some(("not", "\u{ac}")));
        assert_eq!(longest_legacy_prefix("ampx"), Some(("amp", "&")));
        assert_eq!(longest_legacy_prefix("frac12"), Some(("frac12", "\u{bd}")));
        assert_eq!(longest_legacy_prefix("hellip"), None);
        assert!(is_legacy("amp"));
        assert!(!is_legacy("hellip"));
    }

    #[test]
    fn test_reverse_lookup_prefers_short_lowercase() {
        assert_eq!(name_for_char('<'), Some("lt"));
        assert_eq!(name_for_char('"'), Some("quot"));
        assert_eq!(name_for_char('\u{a0}'), Some("nbsp"));
        assert_eq!(name_for_char('x'), None);
    }

    #[test]
    fn test_reverse_lookup_round_trips() {
        for (name, value, _) in ENTITIES.iter().step_by(37) {
            let preferred = name_for(value).unwrap();
            assert_eq!(lookup(preferred), Some(*value), "{name} -> {preferred}");
        }
    }
}
