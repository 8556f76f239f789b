//! Date range parsing with per-side best-effort normalization.

use crate::record::{DateRange, LabelMap};
use crate::text::normalize;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Formats tried in order for each side of a range.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

fn range_re() -> &'static Regex {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    RANGE_RE.get_or_init(|| Regex::new(r"(?i)from:\s*(.+?)\s*to:\s*(.+)").expect("range regex is valid"))
}

/// Normalize a calendar date to `YYYY-MM-DD`.
pub fn normalize_date(text: &str) -> Option<String> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
        return Some(ts.date_naive().format("%Y-%m-%d").to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse `from: <A> to: <B>`. Unmatched text comes back raw; a side that
/// fails to parse keeps its trimmed original substring.
pub fn parse_date_range(raw: &str) -> DateRange {
    let raw_text = normalize(raw);
    let Some(caps) = range_re().captures(&raw_text) else {
        return DateRange {
            from: None,
            to: None,
            raw_text,
        };
    };
    let side = |i: usize| {
        let original = normalize(caps.get(i).map(|m| m.as_str()).unwrap_or_default());
        normalize_date(&original).unwrap_or(original)
    };
    DateRange {
        from: Some(side(1)),
        to: Some(side(2)),
        raw_text: raw_text.clone(),
    }
}

/// Look up the first configured date key across the given maps.
pub fn find_date_range(keys: &[String], sources: &[&LabelMap]) -> Option<DateRange> {
    sources.iter().find_map(|map| {
        keys.iter()
            .find_map(|k| map.get(k))
            .filter(|v| !v.is_empty())
            .map(parse_date_range)
    })
}
