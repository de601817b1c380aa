//! Integration tests for named character reference lookup.

use thicket_html::entities::{is_legacy, is_named, longest_legacy_prefix, lookup, name_for};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup("amp"), Some("&"));
    assert_eq!(lookup("lt"), Some("<"));
    assert_eq!(lookup("gt"), Some(">"));
    assert_eq!(lookup("quot"), Some("\""));
    assert_eq!(lookup("nbsp"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_is_case_sensitive() {
    assert_eq!(lookup("AMP"), Some("&"));
    assert_eq!(lookup("Amp"), None);
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup("notarealentity"), None);
    assert_eq!(lookup(""), None);
    assert!(!is_named("amp;"));
}

#[test]
fn test_legacy_names() {
    assert!(is_legacy("amp"));
    assert!(is_legacy("copy"));
    assert!(!is_legacy("hellip"));
    // Longest match wins: "notin" is not legacy but "not" is.
    assert_eq!(longest_legacy_prefix("notin;"), Some(("not", "\u{ac}")));
    assert_eq!(longest_legacy_prefix("xyz"), None);
}

#[test]
fn test_reverse_lookup() {
    for name in ["amp", "lt", "gt", "copy"] {
        let value = lookup(name).expect("known name");
        assert_eq!(name_for(value), Some(name));
    }
    assert_eq!(name_for("x"), None);
}
