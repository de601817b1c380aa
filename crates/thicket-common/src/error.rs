//! Malformed-input diagnostics.
//!
//! A [`ParseError`] never stops a parse. The tokenizer and tree builders
//! record one, apply their recovery rule, and carry on. Recording is bounded
//! by [`ParseErrorList::max_size`]; once the list is full further diagnostics
//! are dropped.

use std::fmt;

use serde::Serialize;

/// A single recovered-from problem in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Byte offset into the input where the problem was noticed.
    pub position: usize,
    /// Human readable description.
    pub message: String,
}

impl ParseError {
    /// Create a diagnostic at `position`.
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Bounded list of diagnostics owned by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
    max_size: usize,
}

impl ParseErrorList {
    /// A list that records nothing.
    #[must_use]
    pub const fn no_tracking() -> Self {
        Self {
            errors: Vec::new(),
            max_size: 0,
        }
    }

    /// A list that keeps at most `max_size` diagnostics.
    #[must_use]
    pub const fn tracking(max_size: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_size,
        }
    }

    /// Maximum number of diagnostics kept.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether another diagnostic would be kept.
    ///
    /// Callers check this before formatting a message so a parse without
    /// tracking does no string work.
    #[must_use]
    pub fn can_add_error(&self) -> bool {
        self.errors.len() < self.max_size
    }

    /// Record a diagnostic. Returns `false` if the list was already full.
    pub fn push(&mut self, error: ParseError) -> bool {
        if !self.can_add_error() {
            return false;
        }
        self.errors.push(error);
        true
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate recorded diagnostics in the order they were noticed.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    /// Recorded diagnostics as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }

    /// Drop all recorded diagnostics, keeping the bound.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl<'a> IntoIterator for &'a ParseErrorList {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for ParseErrorList {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tracking_drops_everything() {
        let mut errors = ParseErrorList::no_tracking();
        assert!(!errors.can_add_error());
        assert!(!errors.push(ParseError::new(0, "ignored")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_bounded_list_drops_overflow() {
        let mut errors = ParseErrorList::tracking(2);
        assert!(errors.push(ParseError::new(1, "first")));
        assert!(errors.push(ParseError::new(2, "second")));
        assert!(!errors.push(ParseError::new(3, "third")));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.as_slice()[1].message, "second");
    }

    #[test]
    fn test_display_includes_position() {
        let error = ParseError::new(12, "unexpected character");
        assert_eq!(error.to_string(), "12: unexpected character");
    }
}
