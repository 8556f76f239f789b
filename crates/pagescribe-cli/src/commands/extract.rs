//! `pagescribe extract`: one extraction pass.

use std::path::PathBuf;

use pagescribe::Extractor;

use super::{copy_to, load_document, render};
use crate::status::Status;

#[derive(Debug, Clone)]
pub struct ExtractArgs {
    pub html: PathBuf,
    pub url: Option<String>,
    pub out: Option<PathBuf>,
    pub compact: bool,
}

/// Extract, print the record to stdout, and optionally copy it to a file.
pub fn run(args: &ExtractArgs, extractor: &Extractor) -> anyhow::Result<Status> {
    let doc = load_document(&args.html, args.url.as_deref())?;
    let record = extractor.extract(&doc);
    let text = render(&record, args.compact)?;
    println!("{text}");

    let status = match &args.out {
        Some(out) => copy_to(out, &text),
        None => Status::Refreshed,
    };
    tracing::info!(legs = record.legs.len(), metrics = record.metrics.len(), "extracted");
    Ok(status)
}
