//! `pagescribe apply`: write a record into a page's form controls.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pagescribe::{apply_text, Config, MemoryDocument};
use serde_json::json;

use super::load_document;
use crate::status::Status;

#[derive(Debug, Clone)]
pub struct ApplyArgs {
    pub html: PathBuf,
    /// Record file, or `-` for stdin.
    pub record: PathBuf,
    pub url: Option<String>,
}

fn read_record(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read record from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Apply `text` and describe the outcome as JSON: the report, or the parse
/// error, plus every mutation the pass made.
pub fn apply_to(doc: &mut MemoryDocument, text: &str, config: &Config) -> (Status, serde_json::Value) {
    let result = apply_text(doc, text, &config.apply);
    let status = Status::from_apply(&result);
    let mutations = doc.take_mutations();
    let outcome = match &result {
        Ok(report) => json!({ "report": report, "mutations": mutations }),
        Err(e) => json!({ "error": e.to_string(), "mutations": mutations }),
    };
    (status, outcome)
}

pub fn run(args: &ApplyArgs, config: &Config) -> anyhow::Result<Status> {
    let mut doc = load_document(&args.html, args.url.as_deref())?;
    let text = read_record(&args.record)?;
    let (status, outcome) = apply_to(&mut doc, &text, config);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"<body>
        <div><label>Start Date</label><input type="date"></div>
        <div><label>Use VIX</label><button role="switch" aria-checked="false"></button></div>
    </body>"#;

    #[test]
    fn test_apply_outcome_lists_mutations() {
        let mut doc = MemoryDocument::parse(FORM, "about:blank").unwrap();
        let (status, outcome) = apply_to(
            &mut doc,
            r#"{"dateRange": {"from": "2024-01-05"}, "useVix": true}"#,
            &Config::default(),
        );
        assert_eq!(status, Status::Applied);
        assert_eq!(outcome["report"]["status"], "Applied");
        let kinds: Vec<&str> = outcome["mutations"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["type"].as_str())
            .collect();
        assert_eq!(kinds, vec!["set_value", "signal", "signal", "click"]);
    }

    #[test]
    fn test_apply_parse_failure() {
        let mut doc = MemoryDocument::parse(FORM, "about:blank").unwrap();
        let (status, outcome) = apply_to(&mut doc, "not json", &Config::default());
        assert_eq!(status, Status::InvalidJson);
        assert!(outcome["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(outcome["mutations"], json!([]));
    }

    #[test]
    fn test_run_reads_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("form.html");
        let record = dir.path().join("record.json");
        std::fs::write(&html, FORM).unwrap();
        std::fs::write(&record, "   ").unwrap();
        let args = ApplyArgs {
            html,
            record,
            url: None,
        };
        assert_eq!(run(&args, &Config::default()).unwrap(), Status::NothingToApply);
    }
}
