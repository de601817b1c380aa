use super::Tokenizer;
use crate::entities;
use crate::error::Fault;

/// A decoded character reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterReference {
    /// A named reference; some decode to two code points.
    Named(&'static str),
    /// A numeric reference after replacement of invalid code points.
    Numeric(char),
}

impl CharacterReference {
    /// Append the decoded text to `out`.
    pub fn push_to(self, out: &mut String) {
        match self {
            Self::Named(text) => out.push_str(text),
            Self::Numeric(c) => out.push(c),
        }
    }
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Replacements for code points 0x80 to 0x9F. Positions the table leaves
/// undefined keep their own code point.
const WINDOWS_1252: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

const REPLACEMENT: char = '\u{FFFD}';

impl Tokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called with the `&` already consumed. Returns `None` when the text is
    /// not a reference, in which case the caller emits a literal `&` and the
    /// cursor is back where it started.
    ///
    /// `additional_allowed` is the quote closing the current attribute value;
    /// `in_attribute` enables the historical rule for legacy names.
    pub(super) fn consume_character_reference(
        &mut self,
        additional_allowed: Option<char>,
        in_attribute: bool,
    ) -> Result<Option<CharacterReference>, Fault> {
        match self.cursor.current() {
            None | Some('\t' | '\n' | '\x0C' | ' ' | '<' | '&') => return Ok(None),
            Some(c) if Some(c) == additional_allowed => return Ok(None),
            Some(_) => {}
        }

        self.cursor.mark();
        if self.cursor.match_consume("#") {
            self.consume_numeric_reference()
        } else {
            self.consume_named_reference(in_attribute)
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn consume_numeric_reference(&mut self) -> Result<Option<CharacterReference>, Fault> {
        let is_hex = self.cursor.match_consume_ignore_case("x");
        let digits = if is_hex {
            self.cursor.consume_hex_sequence()
        } else {
            self.cursor.consume_digit_sequence()
        };

        // "This is an absence-of-digits-in-numeric-character-reference parse
        // error. Flush code points consumed as a character reference."
        if digits.is_empty() {
            self.error("numeric reference with no numerals");
            self.cursor.rewind_to_mark()?;
            return Ok(None);
        }

        // Overflow is treated like any value above U+10FFFF.
        let code = u32::from_str_radix(digits, if is_hex { 16 } else { 10 }).ok();
        self.cursor.unmark();

        // "This is a missing-semicolon-after-character-reference parse error."
        if !self.cursor.match_consume(";") {
            self.error("missing semicolon on numeric character reference");
        }
        Ok(Some(CharacterReference::Numeric(self.resolve_code_point(code))))
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    fn resolve_code_point(&mut self, code: Option<u32>) -> char {
        match code {
            // "If the number is 0x00, then this is a null-character-reference parse error."
            Some(0) => {
                self.error("character reference resolves to null");
                REPLACEMENT
            }
            // "If the number is a surrogate, then this is a surrogate-character-reference parse error."
            Some(n @ 0xD800..=0xDFFF) => {
                self.error(format_args!("character reference [{n:#X}] is a surrogate"));
                REPLACEMENT
            }
            // "If the number is greater than 0x10FFFF, then this is a
            // character-reference-outside-unicode-range parse error."
            Some(n) if n > 0x0010_FFFF => {
                self.error(format_args!("character reference [{n:#X}] is outside the unicode range"));
                REPLACEMENT
            }
            None => {
                self.error("character reference is outside the unicode range");
                REPLACEMENT
            }
            // "If the number is a control, then this is a control-character-reference
            // parse error. If the number is one of the numbers in the first column
            // of the following table, then find the row with that number..."
            Some(n @ 0x80..=0x9F) => {
                self.error(format_args!("character reference [{n:#X}] is a C1 control"));
                WINDOWS_1252[(n - 0x80) as usize]
            }
            Some(n) => char::from_u32(n).unwrap_or(REPLACEMENT),
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    fn consume_named_reference(
        &mut self,
        in_attribute: bool,
    ) -> Result<Option<CharacterReference>, Fault> {
        let name = self.cursor.consume_letter_then_digit_sequence();
        if name.is_empty() {
            self.cursor.rewind_to_mark()?;
            return Ok(None);
        }
        let exact = entities::lookup(name);
        let legacy = entities::longest_legacy_prefix(name);
        let unknown = exact
            .is_none()
            .then(|| name.to_owned())
            .filter(|_| self.errors.can_add_error());
        let terminated = self.cursor.matches(';');

        if terminated && let Some(value) = exact {
            self.cursor.advance();
            self.cursor.unmark();
            return Ok(Some(CharacterReference::Named(value)));
        }

        if let Some((legacy_name, value)) = legacy {
            self.cursor.rewind_to_mark()?;
            self.cursor.mark();
            let _ = self.cursor.match_consume(legacy_name);

            // "If the character reference was consumed as part of an attribute,
            // and the last character matched is not a U+003B SEMICOLON
            // character (;), and the next input character is either a U+003D
            // EQUALS SIGN character (=) or an ASCII alphanumeric, then, for
            // historical reasons, flush code points consumed as a character
            // reference and switch to the return state."
            if in_attribute
                && (self.cursor.matches_letter()
                    || self.cursor.matches_digit()
                    || self.cursor.matches('='))
            {
                self.cursor.rewind_to_mark()?;
                return Ok(None);
            }

            self.cursor.unmark();
            self.error(format_args!("missing semicolon on [&{legacy_name}]"));
            return Ok(Some(CharacterReference::Named(value)));
        }

        self.cursor.rewind_to_mark()?;
        // "This is an unknown-named-character-reference parse error."
        if terminated && let Some(name) = unknown {
            self.error(format_args!("invalid named reference [{name}]"));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str, in_attribute: bool) -> String {
        let mut tokenizer = Tokenizer::new(input);
        tokenizer.unescape_entities(in_attribute).unwrap()
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode("&#65;&#x42;&#X43;", false), "ABC");
        assert_eq!(decode("&#0;", false), "\u{FFFD}");
        assert_eq!(decode("&#xD800;", false), "\u{FFFD}");
        assert_eq!(decode("&#x110000;", false), "\u{FFFD}");
        assert_eq!(decode("&#99999999999999;", false), "\u{FFFD}");
        assert_eq!(decode("&#x80;", false), "\u{20AC}");
        assert_eq!(decode("&#65", false), "A");
        assert_eq!(decode("&#;", false), "&#;");
        assert_eq!(decode("&#xz", false), "&#xz");
    }

    #[test]
    fn test_named_references() {
        assert_eq!(decode("&lt;&gt;&amp;", false), "<>&");
        assert_eq!(decode("&notit;", false), "\u{ac}it;");
        assert_eq!(decode("&notin;", false), "\u{2209}");
        assert_eq!(decode("&ampx", false), "&x");
        assert_eq!(decode("&bogus; & &;", false), "&bogus; & &;");
    }

    #[test]
    fn test_attribute_legacy_rule() {
        assert_eq!(decode("?a=1&ampb=2", true), "?a=1&ampb=2");
        assert_eq!(decode("&amp=", true), "&amp=");
        assert_eq!(decode("&amp ", true), "& ");
        assert_eq!(decode("&amp;b", true), "&b");
    }

    #[test]
    fn test_diagnostics_are_recorded() {
        let mut tokenizer = Tokenizer::with_errors(
            crate::cursor::Cursor::new("&#0;&bogus;&amp"),
            thicket_common::ParseErrorList::tracking(10),
        );
        assert_eq!(tokenizer.unescape_entities(false).unwrap(), "\u{FFFD}&bogus;&");
        let messages: Vec<_> = tokenizer.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "character reference resolves to null",
                "invalid named reference [bogus]",
                "missing semicolon on [&amp]",
            ]
        );
    }
}
