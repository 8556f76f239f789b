//! The structured record produced by one extraction pass.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered string mapping where the first writer of a key wins.
///
/// Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: Vec<(String, String)>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present. Returns whether it was added.
    pub fn insert_first(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Add every entry of `other` whose key is not present yet.
    pub fn extend_missing(&mut self, other: &LabelMap) {
        for (k, v) in other.iter() {
            self.insert_first(k, v);
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LabelMap::new();
        for (k, v) in iter {
            map.insert_first(k, v);
        }
        map
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Page header block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub title: String,
    pub tags: Vec<String>,
    pub link: String,
}

/// A backtest date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// `YYYY-MM-DD` when parseable, otherwise the trimmed original text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }

    /// Accepts the full word or its initial, any case.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" => Some(Side::Buy),
            "sell" | "s" => Some(Side::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Some(OptionType::Call),
            "put" | "p" => Some(OptionType::Put),
            _ => None,
        }
    }
}

/// A control value that is numeric when its text is fully numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegValue {
    Number(serde_json::Number),
    Raw(String),
}

impl LegValue {
    /// `None` for empty text.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Some(LegValue::Number(n.into()));
        }
        let number = raw.parse::<f64>().ok().and_then(|f| {
            // Integral floats such as `1e3` or `2.0` stay integers.
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(serde_json::Number::from(f as i64))
            } else {
                serde_json::Number::from_f64(f)
            }
        });
        Some(number.map_or_else(|| LegValue::Raw(raw.to_string()), LegValue::Number))
    }

    /// Text suitable for writing back into an input.
    pub fn to_text(&self) -> String {
        match self {
            LegValue::Number(n) => n.to_string(),
            LegValue::Raw(s) => s.clone(),
        }
    }
}

/// One row of the strategy legs table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegEntry {
    pub side: Side,
    pub option_type: OptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<LegValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<LegValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
    pub display_text: String,
}

/// Typed values inferred from free-text list items.
///
/// Absent means "not recognized", never a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    /// 24-hour `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_target_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_exact_dte: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vix_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_vix: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_profits: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_contracts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_pct: Option<u32>,
}

/// Snapshot of what a document showed at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
    pub url: String,
    pub title: String,
    /// RFC 3339 UTC, millisecond precision.
    pub captured_at: String,
    pub header: Header,
    pub metrics: LabelMap,
    pub date_range: Option<DateRange>,
    pub labeled_values: LabelMap,
    pub lists: Vec<Vec<String>>,
    pub legs: Vec<LegEntry>,
    #[serde(flatten)]
    pub derived: DerivedFields,
}

impl StructuredRecord {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Render a float without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_map_first_writer_wins() {
        let mut m = LabelMap::new();
        assert!(m.insert_first("CAGR", "12%"));
        assert!(!m.insert_first("CAGR", "99%"));
        assert_eq!(m.get("CAGR"), Some("12%"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_label_map_serializes_in_insertion_order() {
        let m: LabelMap = [("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        assert_eq!(serde_json::to_string(&m).unwrap(), r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn test_leg_value_parse() {
        assert_eq!(LegValue::parse(""), None);
        assert_eq!(LegValue::parse("2"), Some(LegValue::Number(2.into())));
        assert_eq!(LegValue::parse("0.5").unwrap().to_text(), "0.5");
        assert_eq!(LegValue::parse("5-10"), Some(LegValue::Raw("5-10".into())));
        assert_eq!(LegValue::parse("NaN"), Some(LegValue::Raw("NaN".into())));
    }

    #[test]
    fn test_integral_float_quantity_stays_integer() {
        assert_eq!(LegValue::parse("1e3"), Some(LegValue::Number(1000.into())));
        assert_eq!(LegValue::parse("2.0"), Some(LegValue::Number(2.into())));
        let v = serde_json::to_value(LegValue::parse("1e3").unwrap()).unwrap();
        assert_eq!(v.to_string(), "1000");
    }

    #[test]
    fn test_side_and_type_parse() {
        assert_eq!(Side::parse("Sell"), Some(Side::Sell));
        assert_eq!(Side::parse("b"), Some(Side::Buy));
        assert_eq!(Side::parse("hold"), None);
        assert_eq!(OptionType::parse("PUT"), Some(OptionType::Put));
        assert_eq!(OptionType::parse(""), None);
    }

    #[test]
    fn test_derived_fields_omitted_when_absent() {
        let d = DerivedFields {
            entry_time: Some("09:35".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v, serde_json::json!({"entryTime": "09:35"}));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(12.5), "12.5");
    }
}
