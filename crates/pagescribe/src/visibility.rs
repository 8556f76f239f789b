//! Perceivability filter.
//!
//! Closed modals, unmounted tabs and template placeholders stay in the tree
//! but render nothing. Every extractor checks nodes through here first.

use crate::dom::{Display, Document, NodeId, Visibility};

/// A node is perceivable iff it is an element with a non-empty rendered box
/// whose computed style is neither `visibility: hidden` nor `display: none`.
pub fn is_perceivable<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    if !doc.is_element(node) {
        return false;
    }
    if doc.rendered_size(node).is_empty() {
        return false;
    }
    let style = doc.computed_style(node);
    style.visibility != Visibility::Hidden && style.display != Display::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;
    use crate::dom::{ComputedStyle, DocumentExt, RenderedSize};

    fn parse(html: &str) -> MemoryDocument {
        MemoryDocument::parse(html, "https://example.com/").unwrap()
    }

    #[test]
    fn test_visible_element() {
        let d = parse(r#"<body><p id="p">hello</p></body>"#);
        assert!(is_perceivable(&d, d.element_by_id("p").unwrap()));
    }

    #[test]
    fn test_text_nodes_never_perceivable() {
        let d = parse(r#"<body><p id="p">hello</p></body>"#);
        let p = d.element_by_id("p").unwrap();
        let text = d.children(p)[0];
        assert!(!is_perceivable(&d, text));
    }

    #[test]
    fn test_hidden_variants() {
        let d = parse(
            r#"<body>
                <p id="a" hidden>a</p>
                <p id="b" style="visibility:hidden">b</p>
                <div style="display:none"><p id="c">c</p></div>
                <p id="d"></p>
            </body>"#,
        );
        for id in ["a", "b", "c", "d"] {
            assert!(!is_perceivable(&d, d.element_by_id(id).unwrap()), "{id} should be hidden");
        }
    }

    #[test]
    fn test_explicit_zero_box() {
        let mut d = parse(r#"<body><p id="p">hello</p></body>"#);
        let p = d.element_by_id("p").unwrap();
        d.set_layout(
            p,
            RenderedSize {
                width: 120.0,
                height: 0.0,
            },
            ComputedStyle::default(),
        );
        assert!(!is_perceivable(&d, p));
    }
}
