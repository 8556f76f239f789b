//! Label/value pair extractors: definition lists, two-child containers, and
//! heading-adjacent values.

use crate::config::ExtractConfig;
use crate::dom::{Document, DocumentExt, NodeId};
use crate::record::LabelMap;
use crate::text::{is_value_like, word_count};
use crate::visibility::is_perceivable;

/// `<dt>`/`<dd>` sibling pairs. Definition lists are trusted outright, so no
/// value-shape check applies.
pub fn definition_pairs<D: Document + ?Sized>(doc: &D) -> LabelMap {
    let mut pairs = LabelMap::new();
    for dt in doc.descendants_by_tag(doc.root(), &["dt"]) {
        if !is_perceivable(doc, dt) {
            continue;
        }
        let Some(dd) = doc.next_element_sibling(dt) else {
            continue;
        };
        if !doc.is_tag(dd, "dd") || !is_perceivable(doc, dd) {
            continue;
        }
        let label = doc.clean_text(dt);
        let value = doc.clean_text(dd);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        pairs.insert_first(label, value);
    }
    pairs
}

/// Containers with exactly two perceivable element children, read as
/// label then value. Stat tiles and metric cards render this way.
pub fn two_child_pairs<D: Document + ?Sized>(doc: &D, config: &ExtractConfig) -> LabelMap {
    let mut pairs = LabelMap::new();
    let Some(body) = doc.body() else {
        return pairs;
    };

    // Pre-order walk below body; hidden subtrees are pruned.
    let mut stack: Vec<NodeId> = doc.element_children(body).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if !is_perceivable(doc, node) {
            continue;
        }
        let children: Vec<NodeId> = doc
            .element_children(node)
            .into_iter()
            .filter(|&c| is_perceivable(doc, c))
            .collect();
        if let [label_el, value_el] = children[..] {
            let label = doc.clean_text(label_el);
            let value = doc.clean_text(value_el);
            let short_label = !label.is_empty() && label.chars().count() <= config.max_label_chars;
            if short_label && is_value_like(&value) {
                pairs.insert_first(label, value);
            } else {
                tracing::trace!(%label, "two-child pair rejected");
            }
        }
        stack.extend(children.into_iter().rev());
    }
    pairs
}

/// Heading text paired with the next perceivable sibling's text.
pub fn heading_pairs<D: Document + ?Sized>(doc: &D, config: &ExtractConfig) -> LabelMap {
    let mut pairs = LabelMap::new();
    let headings = doc.descendants_by_tag(doc.root(), &["h1", "h2", "h3", "h4", "h5", "h6"]);
    for heading in headings {
        if !is_perceivable(doc, heading) {
            continue;
        }
        let label = doc.clean_text(heading);
        if label.is_empty() {
            continue;
        }
        let Some(next) = doc.next_element_sibling(heading) else {
            continue;
        };
        if !is_perceivable(doc, next) {
            continue;
        }
        let value = doc.clean_text(next);
        if value.is_empty() || value.chars().count() > config.max_heading_value_chars {
            continue;
        }
        if !is_value_like(&value) && word_count(&value) > config.max_short_value_words {
            continue;
        }
        pairs.insert_first(label, value);
    }
    pairs
}
