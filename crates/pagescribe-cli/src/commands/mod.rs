//! Subcommand implementations.

pub mod apply;
pub mod extract;
pub mod watch;

use std::path::Path;

use anyhow::Context;
use pagescribe::{MemoryDocument, StructuredRecord};

use crate::status::Status;

/// Parse an HTML file. Without `--url` the record carries a `file://` URL.
pub fn load_document(path: &Path, url: Option<&str>) -> anyhow::Result<MemoryDocument> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&html, path, url)
}

pub fn parse_document(html: &str, path: &Path, url: Option<&str>) -> anyhow::Result<MemoryDocument> {
    let url = match url {
        Some(url) => url.to_string(),
        None => format!("file://{}", path.display()),
    };
    MemoryDocument::parse(html, &url).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn render(record: &StructuredRecord, compact: bool) -> anyhow::Result<String> {
    let text = if compact {
        serde_json::to_string(record)?
    } else {
        serde_json::to_string_pretty(record)?
    };
    Ok(text)
}

/// Copy text to a file sink. A refused write is a status, not an error.
pub fn copy_to(path: &Path, text: &str) -> Status {
    match std::fs::write(path, text) {
        Ok(()) => Status::Copied,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "sink write refused");
            Status::ClipboardBlocked
        }
    }
}
