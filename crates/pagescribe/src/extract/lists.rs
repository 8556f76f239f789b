//! Bare list harvesting.

use crate::dom::{Document, DocumentExt};
use crate::visibility::is_perceivable;

/// Every perceivable `<ul>`/`<ol>` with at least one non-empty direct item,
/// in document order. Nested lists show up both inside their parent item's
/// text and as lists of their own.
pub fn extract_lists<D: Document + ?Sized>(doc: &D) -> Vec<Vec<String>> {
    doc.descendants_by_tag(doc.root(), &["ul", "ol"])
        .into_iter()
        .filter(|&list| is_perceivable(doc, list))
        .filter_map(|list| {
            let items: Vec<String> = doc
                .element_children(list)
                .into_iter()
                .filter(|&li| doc.is_tag(li, "li") && is_perceivable(doc, li))
                .map(|li| doc.clean_text(li))
                .filter(|text| !text.is_empty())
                .collect();
            (!items.is_empty()).then_some(items)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;

    #[test]
    fn test_lists_in_document_order() {
        let d = MemoryDocument::parse(
            r#"<body>
                <ul><li>Open trades at 9:35 AM</li><li> Use exact DTE </li></ul>
                <ol><li></li></ol>
                <ul style="display:none"><li>hidden</li></ul>
                <ol><li>Stop loss: 200%</li><li hidden>ghost</li></ol>
            </body>"#,
            "https://example.com/",
        )
        .unwrap();
        let lists = extract_lists(&d);
        assert_eq!(
            lists,
            vec![
                vec!["Open trades at 9:35 AM".to_string(), "Use exact DTE".to_string()],
                vec!["Stop loss: 200%".to_string()],
            ]
        );
    }

    #[test]
    fn test_nested_items_are_not_direct() {
        let d = MemoryDocument::parse(
            r#"<body><ul><li>Entry<ul><li>Daily</li></ul></li></ul></body>"#,
            "https://example.com/",
        )
        .unwrap();
        let lists = extract_lists(&d);
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0], vec!["EntryDaily".to_string()]);
        assert_eq!(lists[1], vec!["Daily".to_string()]);
    }
}
