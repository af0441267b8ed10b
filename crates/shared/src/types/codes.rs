//! ERP chart-of-accounts code normalization.
//!
//! Omie category and account codes arrive with inconsistent formatting
//! (`"01.04.02"`, `"1.04.02"`, `"1.4.2"` all denote the same code).
//! Comparisons must treat these as equivalent.

/// Normalizes an ERP code for comparison.
///
/// Strips every character that is not a digit or a dot, then re-renders
/// each dot-delimited segment without leading zeros. An all-zero segment
/// becomes `"0"`.
///
/// `"01.04.02"` and `"1.4.2"` both normalize to `"1.4.2"`.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    let cleaned: String = code
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned
        .split('.')
        .map(strip_leading_zeros)
        .collect::<Vec<_>>()
        .join(".")
}

/// Returns true when two ERP codes are equivalent.
///
/// Codes match either as raw strings or after normalization.
#[must_use]
pub fn codes_equivalent(a: &str, b: &str) -> bool {
    a == b || normalize_code(a) == normalize_code(b)
}

fn strip_leading_zeros(segment: &str) -> &str {
    let trimmed = segment.trim_start_matches('0');
    if trimmed.is_empty() && !segment.is_empty() {
        "0"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("01.04.02", "1.4.2")]
    #[case("1.4.2", "1.4.2")]
    #[case("1.04.02", "1.4.2")]
    #[case("2.10.98", "2.10.98")]
    #[case("002.010.098", "2.10.98")]
    #[case("3.01", "3.1")]
    #[case("0.00", "0.0")]
    #[case("  1.04.02 ", "1.4.2")]
    #[case("1-04-02", "10402")]
    fn test_normalize_code(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_code(input), expected);
    }

    #[test]
    fn test_codes_equivalent() {
        assert!(codes_equivalent("01.04.02", "1.4.2"));
        assert!(codes_equivalent("1.04.02", "1.04.02"));
        assert!(codes_equivalent("2.10.98", "02.10.98"));
        assert!(!codes_equivalent("1.04.02", "2.10.98"));
        assert!(!codes_equivalent("1.04", "1.04.02"));
    }

    proptest! {
        /// Normalization is idempotent.
        #[test]
        fn prop_normalize_idempotent(code in "[0-9.]{0,16}") {
            let once = normalize_code(&code);
            let twice = normalize_code(&once);
            prop_assert_eq!(once, twice);
        }

        /// Equivalence is symmetric.
        #[test]
        fn prop_equivalence_symmetric(a in "[0-9.]{0,12}", b in "[0-9.]{0,12}") {
            prop_assert_eq!(codes_equivalent(&a, &b), codes_equivalent(&b, &a));
        }

        /// Prefixing segments with zeros never changes the normal form.
        #[test]
        fn prop_leading_zeros_ignored(segments in prop::collection::vec(1u32..999, 1..5)) {
            let plain = segments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            let padded = segments
                .iter()
                .map(|s| format!("{s:06}"))
                .collect::<Vec<_>>()
                .join(".");
            prop_assert!(codes_equivalent(&plain, &padded));
        }
    }
}
