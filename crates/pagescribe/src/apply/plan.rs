//! Reading an apply record into a flat list of intended writes.
//!
//! Two record shapes are accepted. The "input" shape (both `dates` and
//! `ticker` present) is what a person types by hand; the "result" shape is
//! what extraction produces. Both project onto the same [`FormPlan`].
//! Lookups are lenient: a field of the wrong JSON type is treated as absent.

use super::toggles::{ToggleSpec, TOGGLES};
use crate::extract::dates::parse_date_range;
use crate::record::{format_number, OptionType, Side};
use crate::text::{normalize, strip_to_number};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    Input,
    Result,
}

impl RecordShape {
    pub fn detect(object: &Map<String, Value>) -> Self {
        if object.contains_key("dates") && object.contains_key("ticker") {
            RecordShape::Input
        } else {
            RecordShape::Result
        }
    }
}

/// One leg to write into the leg group at the same index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegPlan {
    pub side: Option<Side>,
    pub option_type: Option<OptionType>,
    pub quantity: Option<String>,
    pub days_to_expiry: Option<String>,
    pub greek: Option<String>,
}

/// Everything an apply pass will try to write, in apply order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPlan {
    pub shape: RecordShape,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub ticker: Option<String>,
    pub legs: Vec<LegPlan>,
    pub toggles: Vec<(&'static ToggleSpec, bool)>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub vix_max: Option<String>,
    pub profit_target: Option<String>,
    pub profit_target_mode: Option<String>,
    pub max_contracts: Option<String>,
    pub allocation_pct: Option<String>,
    pub entry_days: Option<Vec<String>>,
    /// `(form label, numeric text)` pairs for the fund settings.
    pub funds: Vec<(&'static str, String)>,
}

/// Fund settings: form label, input-shape key, result-shape metric keys.
const FUNDS: &[(&str, &str, &[&str])] = &[
    ("Starting Funds", "startingFunds", &["Starting Capital"]),
    ("Entry Slippage", "entrySlippage", &["Entry Slippage"]),
    ("Exit Slippage", "exitSlippage", &["Exit Slippage"]),
    ("Opening", "openingFees", &["Opening Fees", "Opening Fees:"]),
    ("Closing", "closingFees", &["Closing Fees", "Closing Fees:"]),
];

/// Text of a string or number, `None` for anything else or blank text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = normalize(s);
            (!s.is_empty()).then_some(s)
        }
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format_number(f),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn field_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find_map(scalar_text)
}

fn field_bool(object: &Map<String, Value>, key: &str) -> Option<bool> {
    object.get(key).and_then(Value::as_bool)
}

impl FormPlan {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let shape = RecordShape::detect(object);
        let (date_from, date_to) = match shape {
            RecordShape::Input => object.get("dates").map(input_dates).unwrap_or_default(),
            RecordShape::Result => object
                .get("dateRange")
                .and_then(Value::as_object)
                .map(|r| (field_text(r, &["from"]), field_text(r, &["to"])))
                .unwrap_or_default(),
        };
        let ticker = match shape {
            RecordShape::Input => field_text(object, &["ticker"]),
            RecordShape::Result => object
                .get("header")
                .and_then(Value::as_object)
                .and_then(|h| field_text(h, &["title"])),
        };
        let legs = object
            .get("legs")
            .and_then(Value::as_array)
            .map(|legs| legs.iter().map(leg_plan).collect())
            .unwrap_or_default();
        let toggles = TOGGLES
            .iter()
            .filter_map(|spec| field_bool(object, spec.key).map(|on| (spec, on)))
            .collect();
        let entry_days = object.get("entryDays").and_then(Value::as_array).map(|days| {
            days.iter()
                .filter_map(Value::as_str)
                .map(normalize)
                .collect::<Vec<_>>()
        });
        let funds = FUNDS
            .iter()
            .filter_map(|(label, input_key, metric_keys)| {
                let raw = match shape {
                    RecordShape::Input => field_text(object, &[*input_key]),
                    RecordShape::Result => object
                        .get("metrics")
                        .and_then(Value::as_object)
                        .and_then(|m| field_text(m, metric_keys)),
                }?;
                let number = strip_to_number(&raw);
                (!number.is_empty()).then_some((*label, number))
            })
            .collect();

        Self {
            shape,
            date_from,
            date_to,
            ticker,
            legs,
            toggles,
            entry_time: field_text(object, &["entryTime"]),
            exit_time: field_text(object, &["exitTime"]),
            vix_max: field_text(object, &["vixMax"]),
            profit_target: field_text(object, &["profitTarget"]),
            profit_target_mode: field_text(object, &["profitTargetMode"]),
            max_contracts: field_text(object, &["maxContracts"]),
            allocation_pct: field_text(object, &["allocationPct", "allocation"]),
            entry_days,
            funds,
        }
    }

    pub fn toggle(&self, key: &str) -> Option<bool> {
        self.toggles
            .iter()
            .find(|(spec, _)| spec.key == key)
            .map(|(_, on)| *on)
    }
}

/// `dates` as `{from, to}`, `[from, to]`, or `"from: A to: B"` text.
fn input_dates(dates: &Value) -> (Option<String>, Option<String>) {
    match dates {
        Value::Object(range) => (field_text(range, &["from"]), field_text(range, &["to"])),
        Value::Array(items) => (
            items.first().and_then(scalar_text),
            items.get(1).and_then(scalar_text),
        ),
        Value::String(text) => {
            let range = parse_date_range(text);
            (range.from, range.to)
        }
        _ => (None, None),
    }
}

fn leg_plan(leg: &Value) -> LegPlan {
    let Some(leg) = leg.as_object() else {
        return LegPlan::default();
    };
    let mut plan = LegPlan {
        side: field_text(leg, &["side"]).and_then(|s| Side::parse(&s)),
        option_type: field_text(leg, &["optionType", "type"]).and_then(|t| OptionType::parse(&t)),
        quantity: field_text(leg, &["quantity", "qty"]),
        days_to_expiry: field_text(leg, &["daysToExpiry", "dte"]),
        greek: field_text(leg, &["greek", "delta"]),
    };
    // "Sell Put qty 1 dte 45" carries side and type when the fields don't.
    if let Some(display) = field_text(leg, &["displayText", "text"]) {
        let mut words = display.split(' ');
        if plan.side.is_none() {
            plan.side = words.next().and_then(Side::parse);
        } else {
            words.next();
        }
        if plan.option_type.is_none() {
            plan.option_type = words.next().and_then(OptionType::parse);
        }
    }
    plan
}
