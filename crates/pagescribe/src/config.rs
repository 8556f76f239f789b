//! Tunable heuristics.
//!
//! Every threshold and pattern the engine relies on lives here as a named
//! default. The numbers were tuned against one observed layout, so each one
//! can be overridden from a JSON file; missing keys keep their defaults.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest label accepted by the two-child pair heuristic.
pub const DEFAULT_MAX_LABEL_CHARS: usize = 32;
/// Longest value accepted after a heading.
pub const DEFAULT_MAX_HEADING_VALUE_CHARS: usize = 64;
/// A heading value this short passes even when it is not value-like.
pub const DEFAULT_MAX_SHORT_VALUE_WORDS: usize = 6;
/// Merged keys with more words than this are dropped.
pub const DEFAULT_MAX_KEY_WORDS: usize = 4;
/// Merged values with more words than this are dropped.
pub const DEFAULT_MAX_VALUE_WORDS: usize = 8;
/// Labels whose values are multi-part summaries.
pub const DEFAULT_COMBINED_METRIC_PATTERN: &str =
    "Total Premium|Starting Capital|Ending Capital|Trades|Winners";
pub const DEFAULT_LEGS_TERM_PATTERN: &str = "Legs";
pub const DEFAULT_ENTRY_VOCABULARY: &str = "open trades|daily|dte|portfolio|contract|ema";
pub const DEFAULT_EXIT_VOCABULARY: &str = "stop loss|exit";
pub const DEFAULT_MISC_VOCABULARY: &str = "fee|slippage|cap";
pub const DEFAULT_HEADER_ID: &str = "message-heading";
/// Debounce window for change-driven refresh.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 200;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub apply: ApplyConfig,
    pub refresh: RefreshConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON override from disk.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.extract.max_label_chars == 0 {
            return Err(ConfigError::Invalid("extract.max_label_chars must be positive".into()));
        }
        if self.apply.leg_group_signature.is_empty() {
            return Err(ConfigError::Invalid("apply.leg_group_signature must not be empty".into()));
        }
        Ok(())
    }
}

/// Extraction heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_label_chars: usize,
    pub max_heading_value_chars: usize,
    pub max_short_value_words: usize,
    pub max_key_words: usize,
    pub max_value_words: usize,
    /// Case-insensitive regex; matching merged keys are dropped.
    pub combined_metric_pattern: String,
    /// Case-insensitive regex locating the legs definition term.
    pub legs_term_pattern: String,
    /// Class substrings (case-insensitive) marking a toggle button active.
    pub active_markers: Vec<String>,
    /// Labels holding the backtest date range, in lookup order.
    pub date_keys: Vec<String>,
    pub header_id: String,
    /// A header tag matches when it carries every class of any signature.
    pub tag_signatures: Vec<Vec<String>>,
    /// Classes of the nested selector holding a leg's variant label, in
    /// preference order.
    pub variant_selector_classes: Vec<String>,
    pub entry_vocabulary: String,
    pub exit_vocabulary: String,
    pub misc_vocabulary: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_label_chars: DEFAULT_MAX_LABEL_CHARS,
            max_heading_value_chars: DEFAULT_MAX_HEADING_VALUE_CHARS,
            max_short_value_words: DEFAULT_MAX_SHORT_VALUE_WORDS,
            max_key_words: DEFAULT_MAX_KEY_WORDS,
            max_value_words: DEFAULT_MAX_VALUE_WORDS,
            combined_metric_pattern: DEFAULT_COMBINED_METRIC_PATTERN.to_string(),
            legs_term_pattern: DEFAULT_LEGS_TERM_PATTERN.to_string(),
            active_markers: strings(&["ooRed", "ooGreen"]),
            date_keys: strings(&["Dates:", "Dates"]),
            header_id: DEFAULT_HEADER_ID.to_string(),
            tag_signatures: vec![strings(&["bg-ooGold"]), strings(&["rounded-full", "text-xs"])],
            variant_selector_classes: strings(&["selectInput--nested", "selectInput"]),
            entry_vocabulary: DEFAULT_ENTRY_VOCABULARY.to_string(),
            exit_vocabulary: DEFAULT_EXIT_VOCABULARY.to_string(),
            misc_vocabulary: DEFAULT_MISC_VOCABULARY.to_string(),
        }
    }
}

/// Form-apply heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Classes shared by every leg-editing row in the strategy builder.
    pub leg_group_signature: Vec<String>,
    pub active_markers: Vec<String>,
    /// Class of dropdown buttons whose text span shows the selection.
    pub selector_class: String,
    /// Classes of the span inside a selector that displays its value.
    pub selector_text_classes: Vec<String>,
    /// Class standing in for a `<label>` element.
    pub label_class: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            leg_group_signature: strings(&["flex", "flex-wrap", "gap-2", "items-center", "text-white"]),
            active_markers: strings(&["ooRed", "ooGreen"]),
            selector_class: "selectInput".to_string(),
            selector_text_classes: strings(&["block", "truncate"]),
            label_class: "label".to_string(),
        }
    }
}

/// Change-driven refresh settings for hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub quiet_period_ms: u64,
}

impl RefreshConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.extract.max_label_chars, 32);
        assert_eq!(c.extract.max_value_words, 8);
        assert_eq!(c.refresh.quiet_period(), Duration::from_millis(200));
        assert_eq!(c.apply.leg_group_signature.len(), 5);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let c = Config::from_json_str(r#"{"extract": {"max_label_chars": 40}}"#).unwrap();
        assert_eq!(c.extract.max_label_chars, 40);
        assert_eq!(c.extract.max_heading_value_chars, 64);
        assert_eq!(c.apply.selector_class, "selectInput");
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(Config::from_json_str(r#"{"extract": {"max_label_chars": 0}}"#).is_err());
        assert!(Config::from_json_str(r#"{"apply": {"leg_group_signature": []}}"#).is_err());
        assert!(Config::from_json_str("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"refresh": {{"quiet_period_ms": 50}}}}"#).unwrap();
        let c = Config::from_file(file.path()).unwrap();
        assert_eq!(c.refresh.quiet_period_ms, 50);
    }
}
