//! Writing a structured record back into a document's form controls.
//!
//! Parsing happens before the first write, so a malformed record never
//! leaves the form half-updated. After that every field is best effort: a
//! control that can't be found is noted in [`ApplyReport::skipped`] and the
//! pass moves on.

pub mod controls;
pub mod plan;
pub mod toggles;

use crate::config::ApplyConfig;
use crate::dom::{DocumentMut, NodeId};
use crate::error::ApplyError;
use crate::extract::derived::WEEKDAYS;
use controls::{LegInput, find_labeled_input, find_labeled_switch, find_leg_groups, find_leg_input};
use controls::{find_selector, find_weekday_button, find_word_button, set_toggle, write_selector, write_value};
use plan::{FormPlan, LegPlan};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Outcome class of one apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApplyStatus {
    Applied,
    AppliedPartial,
    ParseError,
}

impl ApplyStatus {
    pub fn of(result: &Result<ApplyReport, ApplyError>) -> Self {
        match result {
            Ok(report) => report.status,
            Err(_) => ApplyStatus::ParseError,
        }
    }
}

/// Which record fields reached a control and which were skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    pub status: ApplyStatus,
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// Parse `text` as a record and apply it.
pub fn apply_text<D: DocumentMut + ?Sized>(
    doc: &mut D,
    text: &str,
    config: &ApplyConfig,
) -> Result<ApplyReport, ApplyError> {
    if text.trim().is_empty() {
        return Err(ApplyError::Empty);
    }
    let value: Value = serde_json::from_str(text)?;
    apply_value(doc, &value, config)
}

/// Apply an already-parsed record. It must be a JSON object.
pub fn apply_value<D: DocumentMut + ?Sized>(
    doc: &mut D,
    value: &Value,
    config: &ApplyConfig,
) -> Result<ApplyReport, ApplyError> {
    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Err(ApplyError::NotAnObject("null")),
        Value::Bool(_) => return Err(ApplyError::NotAnObject("boolean")),
        Value::Number(_) => return Err(ApplyError::NotAnObject("number")),
        Value::String(_) => return Err(ApplyError::NotAnObject("string")),
        Value::Array(_) => return Err(ApplyError::NotAnObject("array")),
    };
    let plan = FormPlan::from_object(object);
    debug!(shape = ?plan.shape, legs = plan.legs.len(), "apply plan built");
    Ok(Pass::new(doc, config).run(&plan))
}

/// One apply pass over a document.
struct Pass<'a, D: DocumentMut + ?Sized> {
    doc: &'a mut D,
    config: &'a ApplyConfig,
    applied: Vec<String>,
    skipped: Vec<String>,
}

impl<'a, D: DocumentMut + ?Sized> Pass<'a, D> {
    fn new(doc: &'a mut D, config: &'a ApplyConfig) -> Self {
        Self {
            doc,
            config,
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn run(mut self, plan: &FormPlan) -> ApplyReport {
        if let Some(from) = &plan.date_from {
            self.labeled_value("dateRange.from", "Start Date", from);
        }
        if let Some(to) = &plan.date_to {
            self.labeled_value("dateRange.to", "End Date", to);
        }
        if let Some(ticker) = &plan.ticker {
            self.selector("ticker", "ticker", ticker);
        }
        if !plan.legs.is_empty() {
            self.legs(&plan.legs);
        }
        // Toggles go first so inputs they enable (Max VIX) are live.
        for (spec, on) in &plan.toggles {
            self.switch(spec.key, spec.label, *on);
        }
        let scalars = [
            ("entryTime", "Entry Time", &plan.entry_time),
            ("exitTime", "Exit Time", &plan.exit_time),
            ("vixMax", "Max VIX", &plan.vix_max),
            ("profitTarget", "Profit Target", &plan.profit_target),
            ("maxContracts", "Max Contracts", &plan.max_contracts),
            ("allocationPct", "Allocation", &plan.allocation_pct),
        ];
        for (field, label, value) in scalars {
            if let Some(value) = value {
                self.labeled_value(field, label, value);
            }
        }
        if let Some(mode) = &plan.profit_target_mode {
            self.selector("profitTargetMode", "Profit Target", mode);
        }
        if let Some(days) = &plan.entry_days {
            self.weekdays(days);
        }
        for (label, value) in &plan.funds {
            self.labeled_value(label, label, value);
        }
        self.finish()
    }

    fn record(&mut self, field: &str, found: bool) {
        if found {
            self.applied.push(field.to_string());
        } else {
            debug!(field, "apply target not found");
            self.skipped.push(field.to_string());
        }
    }

    fn labeled_value(&mut self, field: &str, label: &str, value: &str) {
        let target = find_labeled_input(&*self.doc, label, self.config);
        if let Some(input) = target {
            write_value(&mut *self.doc, input, value);
        }
        self.record(field, target.is_some());
    }

    fn selector(&mut self, field: &str, label: &str, text: &str) {
        let written = match find_selector(&*self.doc, label, self.config) {
            Some(selector) => write_selector(&mut *self.doc, selector, text, self.config),
            None => false,
        };
        self.record(field, written);
    }

    fn switch(&mut self, field: &str, label: &str, on: bool) {
        let target = find_labeled_switch(&*self.doc, label, self.config);
        if let Some(switch) = target {
            set_toggle(&mut *self.doc, switch, on, self.config);
        }
        self.record(field, target.is_some());
    }

    fn legs(&mut self, legs: &[LegPlan]) {
        let groups = find_leg_groups(&*self.doc, self.config);
        for (idx, leg) in legs.iter().enumerate() {
            let Some(&group) = groups.get(idx) else {
                self.record(&format!("legs[{idx}]"), false);
                continue;
            };
            if let Some(side) = leg.side {
                self.leg_button(idx, "side", group, side.as_str());
            }
            if let Some(option_type) = leg.option_type {
                self.leg_button(idx, "optionType", group, option_type.as_str());
            }
            let inputs = [
                ("quantity", LegInput::Quantity, &leg.quantity),
                ("daysToExpiry", LegInput::DaysToExpiry, &leg.days_to_expiry),
                ("greek", LegInput::Greek, &leg.greek),
            ];
            for (name, which, value) in inputs {
                let Some(value) = value else { continue };
                let target = find_leg_input(&*self.doc, group, which);
                if let Some(input) = target {
                    write_value(&mut *self.doc, input, value);
                }
                self.record(&format!("legs[{idx}].{name}"), target.is_some());
            }
        }
    }

    /// Side and type buttons only ever turn on; the host clears the sibling.
    fn leg_button(&mut self, idx: usize, name: &str, group: NodeId, word: &str) {
        let target = find_word_button(&*self.doc, group, word);
        if let Some(button) = target {
            set_toggle(&mut *self.doc, button, true, self.config);
        }
        self.record(&format!("legs[{idx}].{name}"), target.is_some());
    }

    fn weekdays(&mut self, days: &[String]) {
        for day in WEEKDAYS {
            let wanted = days.iter().any(|d| d.eq_ignore_ascii_case(day));
            let target = find_weekday_button(&*self.doc, day);
            if let Some(button) = target {
                set_toggle(&mut *self.doc, button, wanted, self.config);
            }
            // Days the form doesn't offer only matter when requested.
            if target.is_some() || wanted {
                self.record(&format!("entryDays.{day}"), target.is_some());
            }
        }
    }

    fn finish(self) -> ApplyReport {
        let status = if self.skipped.is_empty() {
            ApplyStatus::Applied
        } else {
            ApplyStatus::AppliedPartial
        };
        info!(
            applied = self.applied.len(),
            skipped = self.skipped.len(),
            "apply pass complete"
        );
        ApplyReport {
            status,
            applied: self.applied,
            skipped: self.skipped,
        }
    }
}
