//! Text canonicalization shared by every extractor and the applier.

use regex::Regex;
use std::sync::OnceLock;

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of space-separated words in already-normalized text.
pub fn word_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.split(' ').count()
}

/// Whether text looks like a metric value: carries a digit, a currency
/// symbol, a percent sign, or a plus/minus sign.
pub fn is_value_like(text: &str) -> bool {
    static VALUE_RE: OnceLock<Regex> = OnceLock::new();
    VALUE_RE
        .get_or_init(|| Regex::new(r"[\d$€£¥%±+\-−]").expect("value regex is valid"))
        .is_match(text)
}

/// Keep only ASCII digits and dots, e.g. `"$100,000"` → `"100000"`.
pub fn strip_to_number(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
