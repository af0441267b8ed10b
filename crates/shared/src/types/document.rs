//! CPF/CNPJ document handling.
//!
//! ERP party records store documents masked (`123.456.789-00`), unmasked
//! (`12345678900`), or inconsistently formatted. Lookups must resolve a
//! party regardless of which form either side uses.

use serde::{Deserialize, Serialize};

/// A CPF or CNPJ as supplied by a caller or stored in a party record.
///
/// Keeps the raw string alongside its digits-only form; equality is
/// defined over the digits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The document exactly as supplied.
    pub raw: String,
    /// Digits-only form used for tolerant matching.
    pub digits: String,
}

impl Document {
    /// Parses a document from any formatting.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            raw: input.trim().to_string(),
            digits: digits(input),
        }
    }

    /// Returns true when the raw form carries mask characters.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.raw.chars().any(|c| !c.is_ascii_digit())
    }

    /// Returns true when no digits were present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Returns true when this document denotes the same identity as `other`.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        !self.digits.is_empty() && self.digits == digits(other)
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Strips every non-digit character from a document string.
#[must_use]
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123.456.789-00", "12345678900")]
    #[case("12345678900", "12345678900")]
    #[case("12.345.678/0001-90", "12345678000190")]
    #[case("  123.456.789-00  ", "12345678900")]
    #[case("", "")]
    fn test_digits(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(digits(input), expected);
    }

    #[test]
    fn test_masked_and_unmasked_match() {
        let masked = Document::parse("123.456.789-00");
        assert!(masked.is_masked());
        assert!(masked.matches("12345678900"));
        assert!(masked.matches("123.456.789-00"));

        let unmasked = Document::parse("12345678900");
        assert!(!unmasked.is_masked());
        assert!(unmasked.matches("123.456.789-00"));
    }

    #[test]
    fn test_empty_document_never_matches() {
        let empty = Document::parse("---");
        assert!(empty.is_empty());
        assert!(!empty.matches(""));
        assert!(!empty.matches("12345678900"));
    }

    #[test]
    fn test_different_documents_do_not_match() {
        let doc = Document::parse("123.456.789-00");
        assert!(!doc.matches("987.654.321-00"));
    }
}
