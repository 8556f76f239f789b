//! Primitive extractors and the [`Extractor`] entry point.
//!
//! Each extractor scans the document on its own and returns a fragment;
//! none of them depends on another's output. [`crate::assemble`] merges the
//! fragments into one [`StructuredRecord`] under a fixed precedence.

pub mod dates;
pub mod derived;
pub mod header;
pub mod legs;
pub mod lists;
pub mod pairs;

use crate::assemble::{Fragments, MergePolicy, PageInfo};
use crate::config::ExtractConfig;
use crate::dom::Document;
use crate::error::{ConfigError, ConfigResult};
use crate::record::StructuredRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::{Regex, RegexBuilder};

/// Compile a case-insensitive pattern from configuration.
pub(crate) fn compile_ci(field: &'static str, pattern: &str) -> ConfigResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::Pattern { field, source })
}

/// Runs every primitive extractor and assembles the result.
///
/// Construction compiles the configured patterns once; extraction itself is
/// infallible and side-effect free.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
    legs_term: Regex,
    policy: MergePolicy,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> ConfigResult<Self> {
        let legs_term = compile_ci("legs_term_pattern", &config.legs_term_pattern)?;
        let policy = MergePolicy::from_config(&config)?;
        Ok(Self {
            config,
            legs_term,
            policy,
        })
    }

    /// Extract a record stamped with the current time.
    pub fn extract<D: Document + ?Sized>(&self, doc: &D) -> StructuredRecord {
        self.extract_at(doc, Utc::now())
    }

    /// Extract a record stamped with `captured_at`. Two calls on an unchanged
    /// document with the same timestamp produce identical records.
    pub fn extract_at<D: Document + ?Sized>(
        &self,
        doc: &D,
        captured_at: DateTime<Utc>,
    ) -> StructuredRecord {
        let fragments = self.fragments(doc);
        let page = PageInfo {
            url: doc.url(),
            title: doc.title(),
            captured_at: captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let record = self.policy.assemble(fragments, page);
        tracing::debug!(
            metrics = record.metrics.len(),
            labeled_values = record.labeled_values.len(),
            lists = record.lists.len(),
            legs = record.legs.len(),
            "extraction pass complete"
        );
        record
    }

    /// Run the primitive extractors without merging.
    pub fn fragments<D: Document + ?Sized>(&self, doc: &D) -> Fragments {
        Fragments {
            header: header::extract_header(doc, &self.config),
            definition_pairs: pairs::definition_pairs(doc),
            heading_pairs: pairs::heading_pairs(doc, &self.config),
            two_child_pairs: pairs::two_child_pairs(doc, &self.config),
            lists: lists::extract_lists(doc),
            legs: legs::extract_legs(doc, &self.legs_term, &self.config),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default()).expect("default extract patterns are valid")
    }
}
