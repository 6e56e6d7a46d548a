//! Structured PII detection
//!
//! Provides the trait-based matcher interface and the built-in email and phone
//! matchers used by stage 1 of the pipeline.

pub mod email;
pub mod phone;

use crate::domain::Result;
use crate::redaction::models::Span;
use crate::redaction::text::OffsetMap;

pub use email::EmailMatcher;
pub use phone::PhoneMatcher;

/// Trait for structured PII matchers
///
/// Implementations are pure: the same text always yields the same spans and
/// nothing is mutated. Returned spans are ordered by `start` and use char
/// offsets into `text`.
pub trait PatternMatcher: Send + Sync {
    /// Short name used in logs and fault reports
    fn name(&self) -> &'static str;

    /// Detect spans in `text`
    fn detect(&self, text: &str) -> Result<Vec<Span>>;
}

/// Built-in matchers in the order stage 1 runs them
pub fn default_matchers() -> Result<Vec<Box<dyn PatternMatcher>>> {
    Ok(vec![
        Box::new(EmailMatcher::new()?),
        Box::new(PhoneMatcher::new()?),
    ])
}

/// Convert a byte-offset match into a char-offset span, or fail as a pattern fault
pub(crate) fn to_char_span(
    map: &OffsetMap<'_>,
    matcher: &'static str,
    byte_start: usize,
    byte_end: usize,
    make: impl FnOnce(usize, usize) -> Span,
) -> Result<Span> {
    let (start, end) = map.char_range(byte_start, byte_end).ok_or_else(|| {
        tracing::error!(
            matcher,
            byte_start,
            byte_end,
            "Match does not fall on char boundaries"
        );
        crate::domain::RedactorError::pattern_fault(matcher, "match is not on char boundaries")
    })?;
    Ok(make(start, end))
}
