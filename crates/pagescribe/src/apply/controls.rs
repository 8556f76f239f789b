//! Locating form controls and writing to them.
//!
//! Every lookup is by visible label text or a class signature, never by id,
//! because the host form regenerates ids on each render.

use crate::config::ApplyConfig;
use crate::dom::{Document, DocumentExt, DocumentMut, NodeId, Signal};
use crate::extract::derived::WEEKDAYS;
use crate::extract::legs::is_active;
use crate::text::{contains_ci, normalize};

/// Set a control's value and notify the host of both input and change.
pub fn write_value<D: DocumentMut + ?Sized>(doc: &mut D, control: NodeId, value: &str) {
    doc.set_value(control, value);
    doc.dispatch(control, Signal::Input);
    doc.dispatch(control, Signal::Change);
}

/// `<label>` and `.label` elements naming `label`: exact text matches first,
/// then those merely containing it, each in document order.
fn find_labels<D: Document + ?Sized>(doc: &D, label: &str, config: &ApplyConfig) -> Vec<NodeId> {
    let wanted = normalize(label).to_lowercase();
    let (exact, partial): (Vec<_>, Vec<_>) = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&n| {
            (doc.is_tag(n, "label") || doc.has_class(n, &config.label_class))
                && contains_ci(&doc.clean_text(n), label)
        })
        .partition(|&n| doc.clean_text(n).to_lowercase() == wanted);
    exact.into_iter().chain(partial).collect()
}

/// The block that groups a label with its control.
fn label_container<D: Document + ?Sized>(doc: &D, label: NodeId) -> Option<NodeId> {
    doc.parent(label)
        .and_then(|p| doc.closest(p, "div").or(Some(p)))
}

fn is_text_entry<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("textarea") => true,
        Some("input") => !doc
            .attr(node, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio")),
        _ => false,
    }
}

/// First text entry grouped with the best label for `label`.
pub fn find_labeled_input<D: Document + ?Sized>(doc: &D, label: &str, config: &ApplyConfig) -> Option<NodeId> {
    find_labels(doc, label, config).into_iter().find_map(|l| {
        let container = label_container(doc, l)?;
        doc.descendants_by_tag(container, &["input", "textarea"])
            .into_iter()
            .find(|&n| is_text_entry(doc, n))
    })
}

fn is_switch<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("button") => doc.attr(node, "role") == Some("switch"),
        Some("input") => doc
            .attr(node, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox")),
        _ => false,
    }
}

/// First switch button or checkbox grouped with the best label for `label`.
pub fn find_labeled_switch<D: Document + ?Sized>(doc: &D, label: &str, config: &ApplyConfig) -> Option<NodeId> {
    find_labels(doc, label, config).into_iter().find_map(|l| {
        let container = label_container(doc, l)?;
        doc.descendants(container)
            .into_iter()
            .find(|&n| is_switch(doc, n))
    })
}

/// Current on/off state of a switch, checkbox, or toggle button.
pub fn toggle_state<D: Document + ?Sized>(doc: &D, node: NodeId, config: &ApplyConfig) -> bool {
    if doc.is_tag(node, "input") {
        return doc.attr(node, "checked").is_some();
    }
    doc.attr(node, "aria-checked") == Some("true")
        || doc.attr(node, "aria-pressed") == Some("true")
        || is_active(doc, node, &config.active_markers)
}

/// Click the toggle only if its state differs. Returns whether it clicked.
pub fn set_toggle<D: DocumentMut + ?Sized>(doc: &mut D, node: NodeId, on: bool, config: &ApplyConfig) -> bool {
    if toggle_state(doc, node, config) == on {
        return false;
    }
    doc.click(node);
    true
}

/// Selector button whose enclosing block is preceded by a label containing `label`.
pub fn find_selector<D: Document + ?Sized>(doc: &D, label: &str, config: &ApplyConfig) -> Option<NodeId> {
    doc.descendants(doc.root()).into_iter().find(|&n| {
        doc.is_tag(n, "button")
            && doc.has_class(n, &config.selector_class)
            && doc
                .parent(n)
                .and_then(|p| doc.closest(p, "div"))
                .and_then(|block| doc.previous_element_sibling(block))
                .is_some_and(|prev| contains_ci(&doc.clean_text(prev), label))
    })
}

/// Overwrite a selector's displayed text. `false` when it has no text span.
pub fn write_selector<D: DocumentMut + ?Sized>(doc: &mut D, selector: NodeId, text: &str, config: &ApplyConfig) -> bool {
    let span = doc
        .descendants_by_tag(selector, &["span"])
        .into_iter()
        .find(|&s| doc.has_classes(s, &config.selector_text_classes));
    let Some(span) = span else {
        return false;
    };
    doc.set_text(span, text);
    doc.dispatch(selector, Signal::Input);
    doc.dispatch(selector, Signal::Change);
    true
}

/// Elements carrying the full leg group class signature, in document order.
pub fn find_leg_groups<D: Document + ?Sized>(doc: &D, config: &ApplyConfig) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.has_classes(n, &config.leg_group_signature))
        .collect()
}

/// Button under `scope` whose text equals `word` or its first letter.
pub fn find_word_button<D: Document + ?Sized>(doc: &D, scope: NodeId, word: &str) -> Option<NodeId> {
    let initial: String = word.chars().take(1).collect();
    doc.descendants_by_tag(scope, &["button"])
        .into_iter()
        .find(|&b| {
            let text = doc.clean_text(b);
            text.eq_ignore_ascii_case(word) || text.eq_ignore_ascii_case(&initial)
        })
}

/// Which leg input a trailing caption marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegInput {
    Quantity,
    DaysToExpiry,
    Greek,
}

fn caption<D: Document + ?Sized>(doc: &D, input: NodeId) -> LegInput {
    let text = doc
        .next_element_sibling(input)
        .map(|s| doc.clean_text(s))
        .unwrap_or_default();
    if contains_ci(&text, "qty") {
        LegInput::Quantity
    } else if contains_ci(&text, "dte") {
        LegInput::DaysToExpiry
    } else {
        LegInput::Greek
    }
}

/// First input in the group followed by the caption for `which`.
pub fn find_leg_input<D: Document + ?Sized>(doc: &D, group: NodeId, which: LegInput) -> Option<NodeId> {
    doc.descendants_by_tag(group, &["input"])
        .into_iter()
        .find(|&i| caption(doc, i) == which)
}

fn names_day(text: &str, day: &str) -> bool {
    let short: String = day.chars().take(3).collect();
    text.eq_ignore_ascii_case(day) || text.eq_ignore_ascii_case(&short)
}

/// The block holding the most weekday buttons. Ties go to the first one.
pub fn find_weekday_strip<D: Document + ?Sized>(doc: &D) -> Option<NodeId> {
    let mut counts: Vec<(NodeId, usize)> = Vec::new();
    for button in doc.descendants_by_tag(doc.root(), &["button"]) {
        let text = doc.clean_text(button);
        if !WEEKDAYS.iter().any(|day| names_day(&text, day)) {
            continue;
        }
        let Some(parent) = doc.parent(button) else {
            continue;
        };
        match counts.iter_mut().find(|(p, _)| *p == parent) {
            Some((_, n)) => *n += 1,
            None => counts.push((parent, 1)),
        }
    }
    counts
        .into_iter()
        .rev()
        .max_by_key(|&(_, n)| n)
        .map(|(strip, _)| strip)
}

/// Weekday toggle in the weekday strip showing the full day name or its
/// three-letter form.
pub fn find_weekday_button<D: Document + ?Sized>(doc: &D, day: &str) -> Option<NodeId> {
    let strip = find_weekday_strip(doc)?;
    doc.descendants_by_tag(strip, &["button"])
        .into_iter()
        .find(|&b| names_day(&doc.clean_text(b), day))
}
