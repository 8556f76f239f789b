//! Document abstraction shared by extraction and apply.
//!
//! The core never owns the document. It borrows a [`Document`] for one pass,
//! walks it through [`NodeId`] handles, and drops every handle when the pass
//! returns. Writes go through [`DocumentMut`], which only the applier uses.

pub mod memory;

use crate::text::normalize;
use serde::{Deserialize, Serialize};

/// Opaque handle to a node inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Notification dispatched on a control after the core writes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Input,
    Change,
    Click,
}

/// Rendered bounding box dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedSize {
    pub width: f32,
    pub height: f32,
}

impl RenderedSize {
    pub const ZERO: RenderedSize = RenderedSize {
        width: 0.0,
        height: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Resolved `display` property, reduced to what visibility checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Display {
    #[default]
    Shown,
    None,
}

/// Resolved `visibility` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Computed style subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

/// Read access to a rendered document tree.
pub trait Document {
    /// The document node itself.
    fn root(&self) -> NodeId;
    /// The `<body>` element, if the document has one.
    fn body(&self) -> Option<NodeId>;
    /// Normalized `<title>` text.
    fn title(&self) -> String;
    /// Location the document was loaded from.
    fn url(&self) -> String;
    fn is_element(&self, node: NodeId) -> bool;
    /// Lower-case tag name for elements, `None` otherwise.
    fn tag(&self, node: NodeId) -> Option<&str>;
    /// All child nodes in document order, text nodes included.
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;
    /// Concatenated text of every descendant text node, rendered or not.
    fn text(&self, node: NodeId) -> String;
    /// Live value of a form control, when one has been set.
    fn value(&self, node: NodeId) -> Option<String>;
    fn rendered_size(&self, node: NodeId) -> RenderedSize;
    fn computed_style(&self, node: NodeId) -> ComputedStyle;
}

/// Write access used by the applier. Every write is followed by the
/// signals the host needs to notice it.
pub trait DocumentMut: Document {
    fn set_value(&mut self, node: NodeId, value: &str);
    /// Replace the node's children with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Activate the node the way a user click would.
    fn click(&mut self, node: NodeId);
    fn dispatch(&mut self, node: NodeId, signal: Signal);
}

/// Traversal helpers available on every [`Document`].
pub trait DocumentExt: Document {
    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.element_children(parent);
        let pos = siblings.iter().position(|&s| s == node)?;
        siblings.get(pos + 1).copied()
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.element_children(parent);
        let pos = siblings.iter().position(|&s| s == node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    /// Element descendants of `node` in pre-order, `node` excluded.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element_children(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.element_children(current).into_iter().rev());
        }
        out
    }

    /// Element descendants with one of the given tag names, in document order.
    fn descendants_by_tag(&self, node: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&n| self.tag(n).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag(node) == Some(tag)
    }

    /// Nearest inclusive ancestor with the given tag.
    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.is_tag(n, tag) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    fn class_attr(&self, node: NodeId) -> &str {
        self.attr(node, "class").unwrap_or("")
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_attr(node).split_whitespace().any(|c| c == class)
    }

    /// Whether the node carries every class of `signature`.
    fn has_classes(&self, node: NodeId, signature: &[String]) -> bool {
        !signature.is_empty() && signature.iter().all(|c| self.has_class(node, c))
    }

    fn clean_text(&self, node: NodeId) -> String {
        normalize(&self.text(node))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }
}

impl<T: Document + ?Sized> DocumentExt for T {}
