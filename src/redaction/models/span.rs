//! Detected span data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of PII a span was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Names of people
    Person,
    /// Geographic locations (cities, streets, regions)
    Location,
    /// Organizations (hospitals, companies, agencies)
    Org,
    /// Other named entities the model could not classify further
    Misc,
}

impl EntityKind {
    /// Get the uppercase label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Org => "ORG",
            Self::Misc => "MISC",
        }
    }

    /// Check if this kind is produced by the structured pattern matchers
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Email | Self::Phone)
    }

    /// Parse a kind from its label (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMAIL" => Some(Self::Email),
            "PHONE" => Some(Self::Phone),
            "PERSON" | "PER" => Some(Self::Person),
            "LOCATION" | "LOC" | "GPE" => Some(Self::Location),
            "ORG" | "ORGANIZATION" => Some(Self::Org),
            "MISC" => Some(Self::Misc),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detection mechanism that produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Deterministic pattern matching (stage 1)
    Regex,
    /// Statistical named-entity recognition (stage 2)
    Nlp,
}

impl DetectionSource {
    /// Resolution priority; higher wins when overlapping spans share a start and length
    pub fn priority(&self) -> u8 {
        match self {
            Self::Regex => 1,
            Self::Nlp => 0,
        }
    }
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex => f.write_str("regex"),
            Self::Nlp => f.write_str("nlp"),
        }
    }
}

/// A half-open character range `[start, end)` tagged with a detected kind
///
/// Offsets count `char`s, not bytes, in the text scanned at the stage that
/// produced the span. Spans never hold the matched substring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive, in chars)
    pub start: usize,
    /// End offset (exclusive, in chars)
    pub end: usize,
    /// Kind of PII
    pub kind: EntityKind,
    /// Detection mechanism
    pub source: DetectionSource,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl Span {
    /// Create a new span with full confidence
    pub fn new(start: usize, end: usize, kind: EntityKind, source: DetectionSource) -> Self {
        Self {
            start,
            end,
            kind,
            source,
            confidence: 1.0,
        }
    }

    /// Set the confidence score, clamped to `[0, 1]`
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Number of chars covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span covers no chars
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check the `0 <= start < end <= text_len` invariant
    pub fn is_within(&self, text_len: usize) -> bool {
        self.start < self.end && self.end <= text_len
    }

    /// Check if two spans share at least one char
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}
