//! Arena-backed [`Document`] built from HTML text.
//!
//! HTML is parsed with `scraper` and copied into a flat node arena. There is
//! no layout engine, so rendered size and computed style are derived from
//! markup alone:
//!
//! - `display:none`, the `hidden` attribute, and never-rendered tags
//!   (`head`, `script`, `style`, `template`, `noscript`) collapse a node and
//!   its whole subtree to zero size.
//! - `visibility` inherits down the tree until a descendant overrides it.
//! - An element with no rendered text and no replaced-element descendant
//!   has zero size, as an empty block would.
//! - Inline `width:0` or `height:0` give zero size.
//!
//! Writes are recorded in an append-only mutation log so callers can see
//! exactly what an apply pass touched.

use super::{ComputedStyle, Display, Document, DocumentMut, NodeId, RenderedSize, Signal, Visibility};
use crate::error::DocumentError;
use scraper::{Html, Node};
use serde::Serialize;
use std::collections::HashMap;

/// Tags the user agent stylesheet never renders.
const UNRENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript", "title", "meta", "link"];

/// Elements that occupy space without any text content.
const REPLACED_TAGS: &[&str] = &["input", "textarea", "select", "img", "svg", "button", "canvas", "video", "iframe", "hr"];

/// Default box for rendered elements.
const DEFAULT_SIZE: RenderedSize = RenderedSize {
    width: 100.0,
    height: 20.0,
};

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Other,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: Option<String>,
    size: RenderedSize,
    style: ComputedStyle,
}

impl NodeData {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            value: None,
            size: RenderedSize::ZERO,
            style: ComputedStyle::default(),
        }
    }
}

/// A single write performed through [`DocumentMut`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation {
    pub node: NodeId,
    #[serde(flatten)]
    pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MutationKind {
    SetValue(String),
    SetText(String),
    Click,
    Signal(Signal),
}

/// In-memory document tree.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    url: String,
    mutations: Vec<Mutation>,
}

impl MemoryDocument {
    /// Parse an HTML document and derive its static layout.
    pub fn parse(html: &str, url: &str) -> Result<Self, DocumentError> {
        let parsed = Html::parse_document(html);
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut index = HashMap::new();

        for node in parsed.tree.root().descendants() {
            let id = NodeId(nodes.len());
            let parent = node.parent().and_then(|p| index.get(&p.id()).copied());
            let kind = match node.value() {
                Node::Document | Node::Fragment => NodeKind::Document,
                Node::Element(el) => NodeKind::Element {
                    tag: el.name().to_ascii_lowercase(),
                    attrs: el
                        .attrs()
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                        .collect(),
                },
                Node::Text(t) => NodeKind::Text((**t).to_string()),
                _ => NodeKind::Other,
            };
            index.insert(node.id(), id);
            nodes.push(NodeData::new(kind, parent));
            if let Some(p) = parent {
                nodes[p.0].children.push(id);
            }
        }

        if nodes.is_empty() {
            return Err(DocumentError::Empty);
        }

        let mut doc = Self {
            nodes,
            url: url.to_string(),
            mutations: Vec::new(),
        };
        doc.compute_layout();
        Ok(doc)
    }

    /// Override the derived layout of a node.
    pub fn set_layout(&mut self, node: NodeId, size: RenderedSize, style: ComputedStyle) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.size = size;
            data.style = style;
        }
    }

    /// Set or replace an attribute without recording a mutation.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            attrs.retain(|(k, _)| k != name);
        }
    }

    /// Every write and signal recorded so far.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn record(&mut self, node: NodeId, kind: MutationKind) {
        self.mutations.push(Mutation { node, kind });
    }

    fn compute_layout(&mut self) {
        // Arena order is pre-order, so parents resolve before children.
        let count = self.nodes.len();
        let mut collapsed = vec![false; count];
        for i in 0..count {
            let parent = self.nodes[i].parent;
            let parent_collapsed = parent.map(|p| collapsed[p.0]).unwrap_or(false);
            let parent_visibility = parent
                .map(|p| self.nodes[p.0].style.visibility)
                .unwrap_or_default();

            let (display, visibility) = match &self.nodes[i].kind {
                NodeKind::Element { tag, attrs } => {
                    let decls = inline_style(attrs);
                    let hidden_attr = attrs.iter().any(|(k, _)| k == "hidden");
                    let display = if hidden_attr
                        || UNRENDERED_TAGS.contains(&tag.as_str())
                        || decl(&decls, "display") == Some("none")
                    {
                        Display::None
                    } else {
                        Display::Shown
                    };
                    let visibility = match decl(&decls, "visibility") {
                        Some("hidden") | Some("collapse") => Visibility::Hidden,
                        Some("visible") => Visibility::Visible,
                        _ => parent_visibility,
                    };
                    (display, visibility)
                }
                _ => (Display::Shown, parent_visibility),
            };
            collapsed[i] = parent_collapsed || display == Display::None;
            self.nodes[i].style = ComputedStyle {
                display,
                visibility,
            };
        }

        // Children sit after their parents, so a reverse sweep is bottom-up.
        let mut has_content = vec![false; count];
        for i in (0..count).rev() {
            if collapsed[i] {
                continue;
            }
            let content = match &self.nodes[i].kind {
                NodeKind::Text(t) => !t.trim().is_empty(),
                NodeKind::Element { tag, .. } => {
                    REPLACED_TAGS.contains(&tag.as_str())
                        || self.nodes[i].children.iter().any(|c| has_content[c.0])
                }
                NodeKind::Document => true,
                NodeKind::Other => false,
            };
            has_content[i] = content;
        }

        for i in 0..count {
            let zero_inline = match &self.nodes[i].kind {
                NodeKind::Element { attrs, .. } => {
                    let decls = inline_style(attrs);
                    is_zero_length(decl(&decls, "width")) || is_zero_length(decl(&decls, "height"))
                }
                _ => false,
            };
            self.nodes[i].size = if collapsed[i] || !has_content[i] || zero_inline {
                RenderedSize::ZERO
            } else {
                DEFAULT_SIZE
            };
        }
    }

    fn toggle_attr(&mut self, node: NodeId, name: &str) -> bool {
        let Some(current) = self.attr(node, name).map(str::to_string) else {
            return false;
        };
        let next = if current == "true" { "false" } else { "true" };
        self.set_attr(node, name, next);
        true
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { .. } | NodeKind::Document => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
            NodeKind::Other => {}
        }
    }
}

fn inline_style(attrs: &[(String, String)]) -> Vec<(String, String)> {
    attrs
        .iter()
        .find(|(k, _)| k == "style")
        .map(|(_, style)| {
            style
                .split(';')
                .filter_map(|d| d.split_once(':'))
                .map(|(p, v)| (p.trim().to_ascii_lowercase(), v.trim().to_ascii_lowercase()))
                .collect()
        })
        .unwrap_or_default()
}

fn decl<'a>(decls: &'a [(String, String)], property: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|(p, _)| p == property)
        .map(|(_, v)| v.trim_end_matches("!important").trim())
}

fn is_zero_length(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%'))
        .and_then(|v| v.parse::<f32>().ok())
        .is_some_and(|v| v == 0.0)
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn body(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| matches!(&n.kind, NodeKind::Element { tag, .. } if tag == "body"))
            .map(NodeId)
    }

    fn title(&self) -> String {
        self.nodes
            .iter()
            .position(|n| matches!(&n.kind, NodeKind::Element { tag, .. } if tag == "title"))
            .map(|i| crate::text::normalize(&self.text(NodeId(i))))
            .unwrap_or_default()
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node.0).map(|n| &n.kind), Some(NodeKind::Element { .. }))
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Element { attrs, .. }) => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.0).and_then(|n| n.value.clone())
    }

    fn rendered_size(&self, node: NodeId) -> RenderedSize {
        self.nodes
            .get(node.0)
            .map(|n| n.size)
            .unwrap_or(RenderedSize::ZERO)
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.nodes.get(node.0).map(|n| n.style).unwrap_or_default()
    }
}

impl DocumentMut for MemoryDocument {
    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.value = Some(value.to_string());
            self.record(node, MutationKind::SetValue(value.to_string()));
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if node.0 >= self.nodes.len() {
            return;
        }
        let text_id = NodeId(self.nodes.len());
        let mut text_node = NodeData::new(NodeKind::Text(text.to_string()), Some(node));
        text_node.style = self.nodes[node.0].style;
        self.nodes.push(text_node);
        for child in std::mem::replace(&mut self.nodes[node.0].children, vec![text_id]) {
            self.nodes[child.0].parent = None;
        }
        self.record(node, MutationKind::SetText(text.to_string()));
    }

    fn click(&mut self, node: NodeId) {
        if node.0 >= self.nodes.len() {
            return;
        }
        let input_type = self
            .attr(node, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();
        if self.tag(node) == Some("input") && (input_type == "checkbox" || input_type == "radio") {
            if self.attr(node, "checked").is_some() && input_type == "checkbox" {
                self.remove_attr(node, "checked");
            } else {
                self.set_attr(node, "checked", "");
            }
        } else if !self.toggle_attr(node, "aria-checked") {
            self.toggle_attr(node, "aria-pressed");
        }
        self.record(node, MutationKind::Click);
    }

    fn dispatch(&mut self, node: NodeId, signal: Signal) {
        if node.0 < self.nodes.len() {
            self.record(node, MutationKind::Signal(signal));
        }
    }
}
