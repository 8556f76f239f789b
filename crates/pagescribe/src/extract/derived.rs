//! Typed fields inferred from free-text list items.
//!
//! Each recognizer is a pure `(text) -> Option<DerivedField>` function held
//! in an ordered registry. Item recognizers see one list item at a time; list
//! recognizers see a whole list joined with `"; "`. The first recognized
//! value of a field wins.

use crate::record::DerivedFields;
use regex::Regex;
use std::sync::OnceLock;

/// Canonical weekday order for `entryDays`.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One recognized value.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedField {
    EntryTime(String),
    ExitTime(String),
    ProfitTarget { value: f64, mode: &'static str },
    UseExactDte,
    VixMax(f64),
    CapProfits,
    EntryDays(Vec<String>),
    MaxContracts(u32),
    AllocationPct(u32),
}

pub type Recognizer = fn(&str) -> Option<DerivedField>;

/// Recognizers applied to each list item.
pub const ITEM_RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("entry_time", recognize_entry_time),
    ("exit_time", recognize_exit_time),
    ("profit_target", recognize_profit_target),
    ("exact_dte", recognize_exact_dte),
    ("vix_max", recognize_vix_max),
    ("cap_profits", recognize_cap_profits),
    ("entry_days", recognize_entry_days),
];

/// Recognizers applied to each whole list.
pub const LIST_RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("max_contracts", recognize_max_contracts),
    ("allocation", recognize_allocation),
];

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("recognizer regex is valid"))
        }
    };
}

cached_regex!(open_re, r"(?i)open trades at\s+(\d{1,2}):(\d{2})(?:\s*([AP]M))?");
cached_regex!(exit_re, r"(?i)exit trades at\s+(\d{1,2}):(\d{2})(?:\s*([AP]M))?");
cached_regex!(profit_re, r"(?i)profit target:?\s*(\d+(?:\.\d+)?)");
cached_regex!(vix_re, r"(?i)vix:?\s*max:?\s*(\d+(?:\.\d+)?)");
cached_regex!(every_re, r"(?i)\bevery\b");
cached_regex!(contracts_re, r"(?i)up to\s+(\d+)\s+contracts?\b");
cached_regex!(allocate_re, r"(?i)allocate\s+(\d+)(?:\.\d+)?\s*%");

/// Convert `H:MM` with an optional meridiem to 24-hour `HH:MM`.
pub fn to_24_hour(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<String> {
    let hour = match meridiem.map(|m| m.to_ascii_uppercase()).as_deref() {
        Some("AM") if hour == 12 => 0,
        Some("PM") if hour != 12 => hour + 12,
        _ => hour,
    };
    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

fn capture_time(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let hour = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps.get(2)?.as_str().parse().ok()?;
    to_24_hour(hour, minute, caps.get(3).map(|m| m.as_str()))
}

fn capture_number<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

pub fn recognize_entry_time(text: &str) -> Option<DerivedField> {
    capture_time(open_re(), text).map(DerivedField::EntryTime)
}

pub fn recognize_exit_time(text: &str) -> Option<DerivedField> {
    capture_time(exit_re(), text).map(DerivedField::ExitTime)
}

pub fn recognize_profit_target(text: &str) -> Option<DerivedField> {
    capture_number(profit_re(), text).map(|value| DerivedField::ProfitTarget { value, mode: "%" })
}

pub fn recognize_exact_dte(text: &str) -> Option<DerivedField> {
    text.to_lowercase()
        .contains("use exact dte")
        .then_some(DerivedField::UseExactDte)
}

pub fn recognize_vix_max(text: &str) -> Option<DerivedField> {
    capture_number(vix_re(), text).map(DerivedField::VixMax)
}

pub fn recognize_cap_profits(text: &str) -> Option<DerivedField> {
    text.to_lowercase()
        .contains("cap profits")
        .then_some(DerivedField::CapProfits)
}

pub fn recognize_entry_days(text: &str) -> Option<DerivedField> {
    let found = every_re().find(text)?;
    let tail = text[found.end()..].to_lowercase();
    let days: Vec<String> = WEEKDAYS
        .iter()
        .filter(|day| tail.contains(&day.to_lowercase()))
        .map(|day| day.to_string())
        .collect();
    (!days.is_empty()).then_some(DerivedField::EntryDays(days))
}

pub fn recognize_max_contracts(text: &str) -> Option<DerivedField> {
    capture_number(contracts_re(), text).map(DerivedField::MaxContracts)
}

pub fn recognize_allocation(text: &str) -> Option<DerivedField> {
    capture_number(allocate_re(), text).map(DerivedField::AllocationPct)
}

impl DerivedFields {
    /// Record a recognized value unless the field is already set.
    pub fn absorb(&mut self, field: DerivedField) {
        match field {
            DerivedField::EntryTime(t) => {
                self.entry_time.get_or_insert(t);
            }
            DerivedField::ExitTime(t) => {
                self.exit_time.get_or_insert(t);
            }
            DerivedField::ProfitTarget { value, mode } => {
                if self.profit_target.is_none() {
                    self.profit_target = Some(value);
                    self.profit_target_mode = Some(mode.to_string());
                }
            }
            DerivedField::UseExactDte => {
                self.use_exact_dte.get_or_insert(true);
            }
            DerivedField::VixMax(v) => {
                if self.vix_max.is_none() {
                    self.vix_max = Some(v);
                    self.use_vix.get_or_insert(true);
                }
            }
            DerivedField::CapProfits => {
                self.cap_profits.get_or_insert(true);
            }
            DerivedField::EntryDays(days) => {
                self.entry_days.get_or_insert(days);
            }
            DerivedField::MaxContracts(n) => {
                self.max_contracts.get_or_insert(n);
            }
            DerivedField::AllocationPct(n) => {
                self.allocation_pct.get_or_insert(n);
            }
        }
    }
}

/// Run every recognizer over the extracted lists, in document order.
pub fn infer_derived(lists: &[Vec<String>]) -> DerivedFields {
    let mut fields = DerivedFields::default();
    for list in lists {
        for item in list {
            for (name, recognize) in ITEM_RECOGNIZERS {
                if let Some(field) = recognize(item) {
                    tracing::trace!(recognizer = name, %item, "derived field recognized");
                    fields.absorb(field);
                }
            }
        }
        let joined = list.join("; ");
        for (name, recognize) in LIST_RECOGNIZERS {
            if let Some(field) = recognize(&joined) {
                tracing::trace!(recognizer = name, "derived field recognized");
                fields.absorb(field);
            }
        }
    }
    fields
}
