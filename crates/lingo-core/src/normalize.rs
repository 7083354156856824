//! Answer normalization.
//!
//! Produces a canonical comparable form of user-entered and reference
//! answers so grading is robust to accents, case, and punctuation.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a string for answer comparison.
///
/// Steps, in order:
/// 1. NFKD-decompose
/// 2. strip combining diacritical marks
/// 3. lowercase
/// 4. remove characters that are neither word characters nor whitespace
/// 5. collapse whitespace runs to single spaces and trim
///
/// The function is pure and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let decomposed: String = input.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = decomposed.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Normalize an optional string; `None` normalizes to the empty string.
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

/// Check whether two answers are equal after normalization.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    normalize(submitted) == normalize(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_insensitive() {
        assert_eq!(normalize("Café"), normalize("cafe"));
        assert_eq!(normalize("naïve"), "naive");
        assert_eq!(normalize("Überraschung"), "uberraschung");
    }

    #[test]
    fn test_case_and_punctuation() {
        assert_eq!(normalize("The cat, sat!"), "the cat sat");
        assert_eq!(normalize("  Mat.  "), "mat");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("a   b\t\nc"), "a b c");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize("!?."), "");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Café au lait!", "  ZWEI  Wörter ", "déjà-vu", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_answers_match() {
        assert!(answers_match("paris", "Paris"));
        assert!(answers_match("Mat", "mat"));
        assert!(!answers_match("rug", "mat"));
    }
}
