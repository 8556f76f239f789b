//! Transient status lines shown after each operation.

use std::fmt;

use pagescribe::{ApplyError, ApplyReport, ApplyStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Refreshed,
    Copied,
    ClipboardBlocked,
    Applied,
    AppliedPartial,
    InvalidJson,
    NothingToApply,
}

impl Status {
    pub fn from_apply(result: &Result<ApplyReport, ApplyError>) -> Self {
        match result {
            Err(ApplyError::Empty) => Status::NothingToApply,
            Err(_) => Status::InvalidJson,
            Ok(report) => match report.status {
                ApplyStatus::Applied => Status::Applied,
                ApplyStatus::AppliedPartial => Status::AppliedPartial,
                ApplyStatus::ParseError => Status::InvalidJson,
            },
        }
    }

    /// Whether the operation did nothing the caller asked for.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::InvalidJson | Status::NothingToApply)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Refreshed => "Refreshed",
            Status::Copied => "Copied",
            Status::ClipboardBlocked => "Clipboard blocked",
            Status::Applied => "Applied",
            Status::AppliedPartial => "Applied (partial)",
            Status::InvalidJson => "Invalid JSON",
            Status::NothingToApply => "Nothing to apply",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagescribe::{apply_text, ApplyConfig, MemoryDocument};

    fn status_for(text: &str) -> Status {
        let mut doc = MemoryDocument::parse("<body><p>x</p></body>", "about:blank").unwrap();
        Status::from_apply(&apply_text(&mut doc, text, &ApplyConfig::default()))
    }

    #[test]
    fn test_apply_statuses() {
        assert_eq!(status_for(""), Status::NothingToApply);
        assert_eq!(status_for("not json"), Status::InvalidJson);
        assert_eq!(status_for("[1]"), Status::InvalidJson);
        assert_eq!(status_for("{}"), Status::Applied);
        assert_eq!(status_for(r#"{"exitTime": "15:15"}"#), Status::AppliedPartial);
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Status::ClipboardBlocked.to_string(), "Clipboard blocked");
        assert_eq!(Status::AppliedPartial.to_string(), "Applied (partial)");
        assert!(Status::InvalidJson.is_failure());
        assert!(!Status::Copied.is_failure());
    }
}
