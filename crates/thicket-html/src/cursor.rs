//! Read head over the input text.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "Before the tokenization stage, the input stream must be preprocessed by
//! normalizing newlines." CR LF pairs and lone CRs become LF when the cursor
//! is built; after that the buffer is immutable.
//!
//! Offsets are byte offsets into that normalized buffer. Every run-consuming
//! method stops on an ASCII delimiter, so returned slices always fall on char
//! boundaries.

use memchr::{memchr, memchr2, memchr3, memmem};

use crate::error::Fault;

/// Position-tracking reader with one level of backtracking.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: String,
    pos: usize,
    mark: Option<usize>,
}

impl Cursor {
    /// Wrap `input`, normalizing newlines.
    pub fn new(input: impl Into<String>) -> Self {
        let mut input = input.into();
        if input.contains('\r') {
            input = input.replace("\r\n", "\n").replace('\r', "\n");
        }
        Self {
            input,
            pos: 0,
            mark: None,
        }
    }

    /// Decode `bytes` as UTF-8, replacing invalid sequences with U+FFFD.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Current byte offset.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Length of the whole (normalized) input in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Whether everything has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// The character at the current position, without consuming it.
    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The byte `n` bytes ahead of the current position.
    #[must_use]
    pub fn peek(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    /// Consume and return the current character. `None` at end of input.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip the current character.
    pub fn advance(&mut self) {
        let _ = self.consume();
    }

    /// Record the current position for a later [`Cursor::rewind_to_mark`].
    ///
    /// There is a single mark slot; marking again overwrites it.
    pub const fn mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Forget the mark.
    pub const fn unmark(&mut self) {
        self.mark = None;
    }

    /// Return to the marked position, clearing the mark.
    pub fn rewind_to_mark(&mut self) -> Result<(), Fault> {
        match self.mark.take() {
            Some(mark) => {
                self.pos = mark;
                Ok(())
            }
            None => Err(Fault::NoMark),
        }
    }

    fn take(&mut self, len: usize) -> &str {
        let start = self.pos;
        self.pos += len;
        &self.input[start..self.pos]
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &str {
        let len = self
            .rest()
            .bytes()
            .position(|b| !pred(b))
            .unwrap_or(self.input.len() - self.pos);
        self.take(len)
    }

    /// Consume up to (not including) the next `delimiter`, or to the end.
    ///
    /// `delimiter` must be ASCII.
    pub fn consume_to(&mut self, delimiter: u8) -> &str {
        let len = memchr(delimiter, self.rest().as_bytes()).unwrap_or(self.input.len() - self.pos);
        self.take(len)
    }

    /// Consume up to the next occurrence of `sequence`, or to the end.
    pub fn consume_to_str(&mut self, sequence: &str) -> &str {
        let len = memmem::find(self.rest().as_bytes(), sequence.as_bytes())
            .unwrap_or(self.input.len() - self.pos);
        self.take(len)
    }

    /// Consume up to the next byte found in `delimiters`, or to the end.
    ///
    /// Every delimiter must be ASCII.
    pub fn consume_to_any(&mut self, delimiters: &[u8]) -> &str {
        let rest = self.rest().as_bytes();
        let len = match *delimiters {
            [a] => memchr(a, rest),
            [a, b] => memchr2(a, b, rest),
            [a, b, c] => memchr3(a, b, c, rest),
            _ => rest.iter().position(|b| delimiters.contains(b)),
        }
        .unwrap_or(rest.len());
        self.take(len)
    }

    /// Consume everything left.
    pub fn consume_to_end(&mut self) -> &str {
        self.take(self.input.len() - self.pos)
    }

    /// Plain data: everything up to `&`, `<` or NUL.
    pub fn consume_data(&mut self) -> &str {
        self.consume_to_any(b"&<\0")
    }

    /// Raw text and script data: everything up to `<` or NUL.
    pub fn consume_raw_data(&mut self) -> &str {
        self.consume_to_any(b"<\0")
    }

    /// A tag name: everything up to whitespace, `/`, `>` or NUL.
    pub fn consume_tag_name(&mut self) -> &str {
        self.take_while(|b| !matches!(b, b'\t' | b'\n' | b'\r' | b'\x0C' | b' ' | b'/' | b'>' | 0))
    }

    /// A run of ASCII letters.
    pub fn consume_letter_sequence(&mut self) -> &str {
        self.take_while(|b| b.is_ascii_alphabetic())
    }

    /// ASCII letters followed by ASCII digits, as in `frac12` or `sup2`.
    pub fn consume_letter_then_digit_sequence(&mut self) -> &str {
        let rest = self.rest().as_bytes();
        let letters = rest
            .iter()
            .position(|b| !b.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let digits = rest[letters..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len() - letters);
        self.take(letters + digits)
    }

    /// A run of ASCII hex digits.
    pub fn consume_hex_sequence(&mut self) -> &str {
        self.take_while(|b| b.is_ascii_hexdigit())
    }

    /// A run of ASCII decimal digits.
    pub fn consume_digit_sequence(&mut self) -> &str {
        self.take_while(|b| b.is_ascii_digit())
    }

    /// Whether the current character is `c`.
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        self.current() == Some(c)
    }

    /// Whether the input continues with `sequence`.
    #[must_use]
    pub fn matches_str(&self, sequence: &str) -> bool {
        self.rest().starts_with(sequence)
    }

    /// Whether the input continues with `sequence`, ignoring ASCII case.
    #[must_use]
    pub fn matches_ignore_case(&self, sequence: &str) -> bool {
        self.rest()
            .as_bytes()
            .get(..sequence.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(sequence.as_bytes()))
    }

    /// Whether the current character is one of `set`.
    #[must_use]
    pub fn matches_any(&self, set: &[char]) -> bool {
        self.current().is_some_and(|c| set.contains(&c))
    }

    /// Whether the current character is an ASCII letter.
    #[must_use]
    pub fn matches_letter(&self) -> bool {
        self.peek(0).is_some_and(|b| b.is_ascii_alphabetic())
    }

    /// Whether the current character is an ASCII digit.
    #[must_use]
    pub fn matches_digit(&self) -> bool {
        self.peek(0).is_some_and(|b| b.is_ascii_digit())
    }

    /// Consume `sequence` if the input continues with it.
    pub fn match_consume(&mut self, sequence: &str) -> bool {
        if self.matches_str(sequence) {
            self.pos += sequence.len();
            true
        } else {
            false
        }
    }

    /// Consume `sequence` (ignoring ASCII case) if the input continues with it.
    pub fn match_consume_ignore_case(&mut self, sequence: &str) -> bool {
        if self.matches_ignore_case(sequence) {
            self.pos += sequence.len();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_newlines_are_normalized() {
        let mut cursor = Cursor::new("a\r\nb\rc");
        assert_eq!(cursor.consume_to_end(), "a\nb\nc");
    }

    #[test]
    fn test_consume_data_stops_at_markup() {
        let mut cursor = Cursor::new("One &amp; <b>");
        assert_eq!(cursor.consume_data(), "One ");
        assert!(cursor.matches('&'));
        cursor.advance();
        assert_eq!(cursor.consume_data(), "amp; ");
        assert_eq!(cursor.consume(), Some('<'));
        assert_eq!(cursor.consume_tag_name(), "b");
        assert_eq!(cursor.consume(), Some('>'));
        assert!(cursor.is_empty());
        assert_eq!(cursor.consume(), None);
        assert_eq!(cursor.consume_data(), "");
    }

    #[test]
    fn test_multibyte_runs_stay_on_boundaries() {
        let mut cursor = Cursor::new("héllo✓<x");
        assert_eq!(cursor.consume_raw_data(), "héllo✓");
        assert_eq!(cursor.current(), Some('<'));
    }

    #[test]
    fn test_mark_and_rewind() {
        let mut cursor = Cursor::new("&#x41;rest");
        cursor.advance();
        cursor.mark();
        assert!(cursor.match_consume("#"));
        assert!(cursor.match_consume_ignore_case("X"));
        assert_eq!(cursor.consume_hex_sequence(), "41");
        cursor.rewind_to_mark().unwrap();
        assert_eq!(cursor.pos(), 1);
        assert_eq!(cursor.rewind_to_mark(), Err(Fault::NoMark));
    }

    #[test]
    fn test_letter_then_digit_sequence() {
        let mut cursor = Cursor::new("frac12x;");
        assert_eq!(cursor.consume_letter_then_digit_sequence(), "frac12");
        assert!(cursor.matches('x'));
    }

    #[test]
    fn test_consume_to_str() {
        let mut cursor = Cursor::new("a]]b]]>tail");
        assert_eq!(cursor.consume_to_str("]]>"), "a]]b");
        assert!(cursor.match_consume("]]>"));
        assert_eq!(cursor.consume_to_str("]]>"), "tail");
    }

    #[test]
    fn test_matches_ignore_case_short_input() {
        let cursor = Cursor::new("doc");
        assert!(!cursor.matches_ignore_case("DOCTYPE"));
        assert!(cursor.matches_ignore_case("DO"));
    }

    #[quickcheck]
    fn prop_rewind_restores_position(input: String, skip: u8) -> bool {
        let mut cursor = Cursor::new(input);
        for _ in 0..skip % 4 {
            cursor.advance();
        }
        let before = cursor.pos();
        cursor.mark();
        let _ = cursor.consume_data();
        let _ = cursor.consume();
        cursor.rewind_to_mark().is_ok() && cursor.pos() == before
    }

    #[quickcheck]
    fn prop_position_only_moves_forward(input: String) -> bool {
        let mut cursor = Cursor::new(input);
        let mut last = cursor.pos();
        while !cursor.is_empty() {
            let _ = cursor.consume_data();
            let _ = cursor.consume();
            if cursor.pos() < last {
                return false;
            }
            last = cursor.pos();
        }
        true
    }
}
