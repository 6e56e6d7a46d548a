//! Redaction reporting
//!
//! A [`RedactionReport`] records every replacement a call applied: what kind of
//! entity, which detector found it, where it was and how many chars it removed.
//! It never holds the removed text.

use crate::redaction::models::{DetectionSource, EntityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What happened to entity recognition during a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NlpStatus {
    /// Stage 2 ran to completion
    Completed,
    /// Stage 2 was turned off by the options
    Disabled,
    /// The synchronous deadline had passed before stage 2 started
    DeadlineExceeded,
    /// Stage 2 did not finish within its budget
    TimedOut,
    /// The caller cancelled the call while stage 2 was running
    Cancelled,
}

impl NlpStatus {
    /// Check whether stage 2 was requested but did not run to completion
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::DeadlineExceeded | Self::TimedOut | Self::Cancelled
        )
    }

    /// Short snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Disabled => "disabled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for NlpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage that applied a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionStage {
    /// Stage 1: pattern matchers on the original text
    Patterns,
    /// Stage 2: entity recognition on the stage-1 output
    Entities,
}

/// One applied replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Entity kind that was replaced
    pub kind: EntityKind,

    /// Detector that found it
    pub source: DetectionSource,

    /// Number of chars removed from the stage input
    pub char_count_removed: usize,

    /// Char offset of the removed range in the stage input
    pub start: usize,

    /// End of the removed range (exclusive)
    pub end: usize,

    /// Stage that applied the replacement
    pub stage: RedactionStage,
}

/// Ordered record of the replacements of one call
///
/// Entries are in application order: right to left within a stage, stage 1
/// before stage 2.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactionReport {
    entries: Vec<ReportEntry>,
}

impl RedactionReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entries of one stage, already in application order
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ReportEntry>) {
        self.entries.extend(entries);
    }

    /// All entries in application order
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries applied by one stage
    pub fn stage_entries(&self, stage: RedactionStage) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }

    /// Number of replacements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing was redacted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of chars removed over all entries
    pub fn total_chars_removed(&self) -> usize {
        self.entries.iter().map(|e| e.char_count_removed).sum()
    }

    /// Replacement count per entity kind
    pub fn counts_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Format the report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push_str("───────────────────────────────────────────────\n");
        output.push_str("  REDACTION REPORT\n");
        output.push_str("───────────────────────────────────────────────\n");
        output.push_str(&format!("  Replacements:     {}\n", self.len()));
        output.push_str(&format!("  Chars removed:    {}\n", self.total_chars_removed()));

        let counts = self.counts_by_kind();
        if !counts.is_empty() {
            output.push('\n');
            for (kind, count) in counts {
                output.push_str(&format!("  {:16} {:>5}\n", kind.label(), count));
            }
        }

        if !self.entries.is_empty() {
            output.push('\n');
            for entry in &self.entries {
                output.push_str(&format!(
                    "  {:?} {:>6}..{:<6} {:10} via {}\n",
                    entry.stage,
                    entry.start,
                    entry.end,
                    entry.kind.label(),
                    entry.source
                ));
            }
        }
        output.push_str("───────────────────────────────────────────────\n");

        output
    }

    /// Format the report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntityKind, start: usize, end: usize, stage: RedactionStage) -> ReportEntry {
        let source = if stage == RedactionStage::Patterns {
            DetectionSource::Regex
        } else {
            DetectionSource::Nlp
        };
        ReportEntry {
            kind,
            source,
            char_count_removed: end - start,
            start,
            end,
            stage,
        }
    }

    #[test]
    fn test_empty_report() {
        let report = RedactionReport::new();
        assert!(report.is_empty());
        assert_eq!(report.total_chars_removed(), 0);
        assert!(report.counts_by_kind().is_empty());
    }

    #[test]
    fn test_counts_and_totals() {
        let mut report = RedactionReport::new();
        report.extend(vec![
            entry(EntityKind::Phone, 30, 44, RedactionStage::Patterns),
            entry(EntityKind::Email, 5, 20, RedactionStage::Patterns),
        ]);
        report.extend(vec![entry(EntityKind::Person, 0, 4, RedactionStage::Entities)]);

        assert_eq!(report.len(), 3);
        assert_eq!(report.total_chars_removed(), 14 + 15 + 4);
        let counts = report.counts_by_kind();
        assert_eq!(counts.get(&EntityKind::Email), Some(&1));
        assert_eq!(counts.get(&EntityKind::Person), Some(&1));
        assert_eq!(report.stage_entries(RedactionStage::Patterns).count(), 2);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut report = RedactionReport::new();
        report.extend(vec![
            entry(EntityKind::Phone, 30, 44, RedactionStage::Patterns),
            entry(EntityKind::Email, 5, 20, RedactionStage::Patterns),
        ]);
        let starts: Vec<_> = report.entries().iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![30, 5]);
    }

    #[test]
    fn test_json_has_no_text_fields() {
        let mut report = RedactionReport::new();
        report.extend(vec![entry(EntityKind::Email, 5, 20, RedactionStage::Patterns)]);
        let json = report.format_json().unwrap();
        assert!(json.contains("\"kind\": \"EMAIL\""));
        assert!(json.contains("\"source\": \"regex\""));
        assert!(json.contains("\"char_count_removed\": 15"));
        assert!(json.contains("\"stage\": \"patterns\""));
    }

    #[test]
    fn test_nlp_status() {
        assert!(NlpStatus::TimedOut.is_skipped());
        assert!(NlpStatus::Cancelled.is_skipped());
        assert!(!NlpStatus::Disabled.is_skipped());
        assert_eq!(
            serde_json::to_string(&NlpStatus::DeadlineExceeded).unwrap(),
            "\"deadline_exceeded\""
        );
        assert_eq!(NlpStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_format_console() {
        let mut report = RedactionReport::new();
        report.extend(vec![entry(EntityKind::Email, 5, 20, RedactionStage::Patterns)]);
        let output = report.format_console();
        assert!(output.contains("REDACTION REPORT"));
        assert!(output.contains("Replacements:     1"));
        assert!(output.contains("EMAIL"));
    }
}
