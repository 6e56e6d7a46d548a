//! North American phone number matcher
//!
//! Two sub-patterns run in sequence. The formatted pattern needs a negative
//! lookbehind, so it is compiled with `fancy_regex` under a bounded
//! backtracking budget; the bare-digit pattern is plain `regex`. Bare digit
//! runs are searched on a copy of the text with formatted matches blanked out,
//! so nothing is matched twice.

use super::{to_char_span, PatternMatcher};
use crate::domain::{RedactorError, Result};
use crate::redaction::models::{DetectionSource, EntityKind, Span};
use crate::redaction::text::OffsetMap;
use fancy_regex::{Regex as FancyRegex, RegexBuilder};
use regex::Regex;

/// Optional `+1`/`1` prefix, `(ddd)` or `ddd` area code, `.`/`-`/space
/// separators, and a final group of four digits or two pairs split by whitespace.
const FORMATTED_PATTERN: &str =
    r"(?<!\w)(?:\+?1[\s.-]*)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?(?:\d{4}|\d{2}\s\d{2})\b";

/// Ten digits, or eleven with a leading `1`
const NUMERIC_PATTERN: &str = r"\b1?\d{10}\b";

/// Default backtracking budget for the formatted pattern
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// Matches formatted and bare-digit phone numbers
#[derive(Debug, Clone)]
pub struct PhoneMatcher {
    formatted: FancyRegex,
    numeric: Regex,
}

impl PhoneMatcher {
    /// Create a new phone matcher with the default backtracking budget
    pub fn new() -> Result<Self> {
        Self::with_backtrack_limit(DEFAULT_BACKTRACK_LIMIT)
    }

    /// Create a new phone matcher with a custom backtracking budget
    pub fn with_backtrack_limit(limit: usize) -> Result<Self> {
        let formatted = RegexBuilder::new(FORMATTED_PATTERN)
            .backtrack_limit(limit)
            .build()
            .map_err(|e| RedactorError::pattern_fault("phone", format!("invalid pattern: {e}")))?;
        let numeric = Regex::new(NUMERIC_PATTERN)
            .map_err(|e| RedactorError::pattern_fault("phone", format!("invalid pattern: {e}")))?;
        Ok(Self { formatted, numeric })
    }

    /// Byte ranges of formatted numbers
    fn formatted_ranges(&self, text: &str) -> Result<Vec<(usize, usize)>> {
        let mut ranges = Vec::new();
        for found in self.formatted.find_iter(text) {
            let m = found.map_err(|e| {
                tracing::error!(matcher = "phone", error = %e, "Formatted phone pattern failed");
                RedactorError::pattern_fault("phone", e.to_string())
            })?;
            ranges.push((m.start(), m.end()));
        }
        Ok(ranges)
    }
}

/// Replace every byte of the given ranges with a space, keeping byte offsets stable
fn blank_out(text: &str, ranges: &[(usize, usize)]) -> String {
    let mut masked = text.to_string();
    for &(start, end) in ranges {
        masked.replace_range(start..end, &" ".repeat(end - start));
    }
    masked
}

impl PatternMatcher for PhoneMatcher {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn detect(&self, text: &str) -> Result<Vec<Span>> {
        let map = OffsetMap::new(text);
        let mut ranges = self.formatted_ranges(text)?;

        if !ranges.is_empty() {
            let masked = blank_out(text, &ranges);
            ranges.extend(self.numeric.find_iter(&masked).map(|m| (m.start(), m.end())));
        } else {
            ranges.extend(self.numeric.find_iter(text).map(|m| (m.start(), m.end())));
        }
        ranges.sort_unstable();

        ranges
            .into_iter()
            .map(|(start, end)| {
                to_char_span(&map, self.name(), start, end, |s, e| {
                    Span::new(s, e, EntityKind::Phone, DetectionSource::Regex)
                })
            })
            .collect()
    }
}
