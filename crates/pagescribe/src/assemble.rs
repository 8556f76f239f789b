//! Payload assembly: merge extractor fragments into one record.
//!
//! Precedence in the generic label/value namespace is definition lists,
//! then headings, then two-child containers; a later source only fills keys
//! the earlier ones left open. After the merge, keys that look like
//! multi-part summaries or paragraph text are dropped.

use crate::config::ExtractConfig;
use crate::error::ConfigResult;
use crate::extract::compile_ci;
use crate::extract::dates::find_date_range;
use crate::extract::derived::infer_derived;
use crate::record::{Header, LabelMap, LegEntry, StructuredRecord};
use crate::text::word_count;
use regex::Regex;

/// Output of the primitive extractors for one pass.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    pub header: Header,
    pub definition_pairs: LabelMap,
    pub heading_pairs: LabelMap,
    pub two_child_pairs: LabelMap,
    pub lists: Vec<Vec<String>>,
    pub legs: Vec<LegEntry>,
}

/// Page-level facts stamped onto the record.
#[derive(Debug, Clone, Default)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub captured_at: String,
}

/// Convenience metric synthesized from list vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Entry,
    Exit,
    Misc,
}

impl Bucket {
    pub fn key(&self) -> &'static str {
        match self {
            Bucket::Entry => "Entry",
            Bucket::Exit => "Exit",
            Bucket::Misc => "Misc",
        }
    }
}

/// Compiled merge rules.
#[derive(Debug, Clone)]
pub struct MergePolicy {
    combined_metric: Regex,
    max_key_words: usize,
    max_value_words: usize,
    date_keys: Vec<String>,
    /// Checked in order; a list lands in the first bucket it matches.
    buckets: Vec<(Bucket, Regex)>,
}

impl MergePolicy {
    pub fn from_config(config: &ExtractConfig) -> ConfigResult<Self> {
        Ok(Self {
            combined_metric: compile_ci("combined_metric_pattern", &config.combined_metric_pattern)?,
            max_key_words: config.max_key_words,
            max_value_words: config.max_value_words,
            date_keys: config.date_keys.clone(),
            buckets: vec![
                (Bucket::Entry, compile_ci("entry_vocabulary", &config.entry_vocabulary)?),
                (Bucket::Exit, compile_ci("exit_vocabulary", &config.exit_vocabulary)?),
                (Bucket::Misc, compile_ci("misc_vocabulary", &config.misc_vocabulary)?),
            ],
        })
    }

    /// Merge the three pair sources first-source-wins, then apply the
    /// precision guards.
    pub fn merge_labeled(&self, definitions: &LabelMap, headings: &LabelMap, two_child: &LabelMap) -> LabelMap {
        let mut merged = definitions.clone();
        merged.extend_missing(headings);
        merged.extend_missing(two_child);
        merged.retain(|key, value| {
            let keep = !self.combined_metric.is_match(key)
                && word_count(key) <= self.max_key_words
                && word_count(value) <= self.max_value_words;
            if !keep {
                tracing::trace!(%key, "merged pair dropped");
            }
            keep
        });
        merged
    }

    /// Which bucket a joined list belongs to, if any.
    pub fn classify(&self, joined: &str) -> Option<Bucket> {
        self.buckets
            .iter()
            .find(|(_, re)| re.is_match(joined))
            .map(|(bucket, _)| *bucket)
    }

    /// Definition pairs plus Entry/Exit/Misc drawn from the lists. Each bucket
    /// is written at most once and never over an existing key.
    pub fn synthesize_metrics(&self, definitions: &LabelMap, lists: &[Vec<String>]) -> LabelMap {
        let mut metrics = definitions.clone();
        for list in lists {
            let joined = list.join("; ");
            if let Some(bucket) = self.classify(&joined) {
                metrics.insert_first(bucket.key(), joined);
            }
        }
        metrics
    }

    pub fn assemble(&self, fragments: Fragments, page: PageInfo) -> StructuredRecord {
        let labeled_values = self.merge_labeled(
            &fragments.definition_pairs,
            &fragments.heading_pairs,
            &fragments.two_child_pairs,
        );
        let date_range = find_date_range(
            &self.date_keys,
            &[&fragments.definition_pairs, &labeled_values],
        );
        let metrics = self.synthesize_metrics(&fragments.definition_pairs, &fragments.lists);
        let derived = infer_derived(&fragments.lists);

        StructuredRecord {
            url: page.url,
            title: page.title,
            captured_at: page.captured_at,
            header: fragments.header,
            metrics,
            date_range,
            labeled_values,
            lists: fragments.lists,
            legs: fragments.legs,
            derived,
        }
    }
}
