//! Strategy legs table.
//!
//! The legs live in a table inside the `<dd>` paired with a "Legs" term.
//! Each row shows S/B and C/P toggle buttons, where the active one carries a
//! highlight class, plus quantity and DTE inputs.

use crate::config::ExtractConfig;
use crate::dom::{Document, DocumentExt, NodeId};
use crate::record::{LegEntry, LegValue, OptionType, Side};
use crate::text::normalize;
use crate::visibility::is_perceivable;
use regex::Regex;

/// Whether `text` contains `letter` as a standalone word.
fn has_letter_token(text: &str, letter: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token == letter)
}

/// Whether a toggle button's class list carries an active-state marker.
pub(crate) fn is_active<D: Document + ?Sized>(doc: &D, button: NodeId, markers: &[String]) -> bool {
    let class = doc.class_attr(button).to_lowercase();
    markers
        .iter()
        .any(|m| !m.is_empty() && class.contains(&m.to_lowercase()))
}

/// Live value, falling back to the declared `value` attribute.
pub(crate) fn control_value<D: Document + ?Sized>(doc: &D, input: NodeId) -> String {
    doc.value(input)
        .filter(|v| !v.is_empty())
        .or_else(|| doc.attr(input, "value").map(str::to_string))
        .map(|v| normalize(&v))
        .unwrap_or_default()
}

/// Locate the legs table and read every row with a resolved side and type.
pub fn extract_legs<D: Document + ?Sized>(
    doc: &D,
    legs_term: &Regex,
    config: &ExtractConfig,
) -> Vec<LegEntry> {
    let term = doc
        .descendants_by_tag(doc.root(), &["dt"])
        .into_iter()
        .find(|&dt| legs_term.is_match(&doc.text(dt)));
    let Some(table) = term
        .and_then(|dt| doc.next_element_sibling(dt))
        .and_then(|dd| doc.descendants_by_tag(dd, &["table"]).first().copied())
    else {
        return Vec::new();
    };

    doc.descendants_by_tag(table, &["tbody"])
        .into_iter()
        .flat_map(|tbody| doc.descendants_by_tag(tbody, &["tr"]))
        .filter(|&row| is_perceivable(doc, row))
        .filter_map(|row| read_row(doc, row, config))
        .collect()
}

fn read_row<D: Document + ?Sized>(doc: &D, row: NodeId, config: &ExtractConfig) -> Option<LegEntry> {
    let buttons = doc.descendants_by_tag(row, &["button"]);
    let find = |letter: &str| {
        buttons
            .iter()
            .copied()
            .find(|&b| has_letter_token(&doc.text(b), letter))
    };
    let active = |button: Option<NodeId>| button.is_some_and(|b| is_active(doc, b, &config.active_markers));

    let side = if active(find("S")) {
        Some(Side::Sell)
    } else if active(find("B")) {
        Some(Side::Buy)
    } else {
        None
    };
    let option_type = if active(find("C")) {
        Some(OptionType::Call)
    } else if active(find("P")) {
        Some(OptionType::Put)
    } else {
        None
    };
    let (Some(side), Some(option_type)) = (side, option_type) else {
        tracing::debug!(row = row.0, "leg row without resolved side and type dropped");
        return None;
    };

    let variant_label = config.variant_selector_classes.iter().find_map(|class| {
        buttons
            .iter()
            .copied()
            .find(|&b| doc.has_class(b, class))
            .map(|b| doc.clean_text(b))
    });

    let inputs = doc.descendants_by_tag(row, &["input"]);
    let raw_at = |i: usize| inputs.get(i).map(|&n| control_value(doc, n)).unwrap_or_default();
    let qty_raw = raw_at(0);
    let dte_raw = raw_at(2);

    let mut parts = vec![side.as_str().to_string(), option_type.as_str().to_string()];
    if !qty_raw.is_empty() {
        parts.push(format!("qty {qty_raw}"));
    }
    if !dte_raw.is_empty() {
        parts.push(format!("dte {dte_raw}"));
    }

    Some(LegEntry {
        side,
        option_type,
        quantity: LegValue::parse(&qty_raw),
        days_to_expiry: LegValue::parse(&dte_raw),
        variant_label,
        display_text: normalize(&parts.join(" ")),
    })
}
