//! Page header: title, tag chips, and the link line under the heading.

use crate::config::ExtractConfig;
use crate::dom::{Document, DocumentExt};
use crate::record::Header;

/// Read the header block. A page without one yields an empty header rather
/// than an absent one.
pub fn extract_header<D: Document + ?Sized>(doc: &D, config: &ExtractConfig) -> Header {
    let Some(heading) = doc.element_by_id(&config.header_id) else {
        return Header::default();
    };

    let title = doc
        .descendants_by_tag(heading, &["span"])
        .first()
        .map(|&span| doc.clean_text(span))
        .unwrap_or_default();

    let tags = doc
        .descendants(heading)
        .into_iter()
        .filter(|&n| {
            config
                .tag_signatures
                .iter()
                .any(|signature| doc.has_classes(n, signature))
        })
        .map(|n| doc.clean_text(n))
        .filter(|t| !t.is_empty())
        .collect();

    let link = doc
        .parent(heading)
        .and_then(|parent| doc.descendants_by_tag(parent, &["p"]).first().copied())
        .map(|p| doc.clean_text(p))
        .unwrap_or_default();

    Header { title, tags, link }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;

    #[test]
    fn test_header_fields() {
        let d = MemoryDocument::parse(
            r#"<body><section>
                <div id="message-heading">
                    <span> SPX 45 DTE Put Spread </span>
                    <span class="bg-ooGold px-1">Public</span>
                    <span class="rounded-full text-xs">Iron</span>
                    <span class="rounded-full">NotATag</span>
                </div>
                <p>https://example.com/test/abc</p>
            </section></body>"#,
            "https://example.com/",
        )
        .unwrap();
        let h = extract_header(&d, &ExtractConfig::default());
        assert_eq!(h.title, "SPX 45 DTE Put Spread");
        assert_eq!(h.tags, vec!["Public".to_string(), "Iron".to_string()]);
        assert_eq!(h.link, "https://example.com/test/abc");
    }

    #[test]
    fn test_missing_header_is_empty() {
        let d = MemoryDocument::parse("<body><p>x</p></body>", "https://example.com/").unwrap();
        assert_eq!(extract_header(&d, &ExtractConfig::default()), Header::default());
    }
}
