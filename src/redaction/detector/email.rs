//! Email address matcher

use super::{to_char_span, PatternMatcher};
use crate::domain::{RedactorError, Result};
use crate::redaction::models::{DetectionSource, EntityKind, Span};
use crate::redaction::text::OffsetMap;
use regex::Regex;

/// Local part starts on a word boundary, so `.@example.com` never matches.
/// The domain needs at least one `label.` group and an alphabetic final label.
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]+\b";

/// Matches `local-part@domain.tld` shaped substrings
#[derive(Debug, Clone)]
pub struct EmailMatcher {
    regex: Regex,
}

impl EmailMatcher {
    /// Create a new email matcher
    pub fn new() -> Result<Self> {
        let regex = Regex::new(EMAIL_PATTERN)
            .map_err(|e| RedactorError::pattern_fault("email", format!("invalid pattern: {e}")))?;
        Ok(Self { regex })
    }
}

impl PatternMatcher for EmailMatcher {
    fn name(&self) -> &'static str {
        "email"
    }

    fn detect(&self, text: &str) -> Result<Vec<Span>> {
        let map = OffsetMap::new(text);
        self.regex
            .find_iter(text)
            .map(|m| {
                to_char_span(&map, self.name(), m.start(), m.end(), |start, end| {
                    Span::new(start, end, EntityKind::Email, DetectionSource::Regex)
                })
            })
            .collect()
    }
}
