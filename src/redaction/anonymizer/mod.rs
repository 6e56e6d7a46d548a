//! Placeholder substitution
//!
//! Replaces resolved spans with their placeholder. The rewrite walks the spans
//! from right to left and assembles the output from the untouched slices
//! between them, so offsets of spans not yet applied stay valid.

pub mod placeholder;

use crate::domain::{RedactorError, Result};
use crate::redaction::models::Span;
use crate::redaction::report::{RedactionStage, ReportEntry};
use crate::redaction::resolver::is_resolved;
use crate::redaction::text::OffsetMap;

pub use placeholder::{Placeholders, EMAIL_PLACEHOLDER, ENTITY_PLACEHOLDER, PHONE_PLACEHOLDER};

/// Result of rewriting one stage
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// Text with every span replaced
    pub text: String,
    /// One entry per replacement, in application order (right to left)
    pub entries: Vec<ReportEntry>,
}

/// Replace `spans` in `text` with their placeholders
///
/// `spans` must be resolved (sorted and non-overlapping) and lie within the
/// text; anything else is refused rather than producing a corrupted buffer.
pub fn apply_replacements(text: &str, spans: &[Span], stage: RedactionStage) -> Result<Rewrite> {
    if spans.is_empty() {
        return Ok(Rewrite {
            text: text.to_string(),
            entries: Vec::new(),
        });
    }
    if !is_resolved(spans) {
        return Err(RedactorError::RecognizerFault(
            "replacement spans overlap or are unordered".to_string(),
        ));
    }

    let map = OffsetMap::new(text);
    let mut pieces: Vec<&str> = Vec::with_capacity(spans.len() * 2 + 1);
    let mut entries = Vec::with_capacity(spans.len());
    let mut tail = text.len();

    for span in spans.iter().rev() {
        let (start, end) = map
            .byte_range(span.start, span.end)
            .filter(|&(s, e)| s < e && e <= tail)
            .ok_or_else(|| {
                RedactorError::RecognizerFault(format!(
                    "span {}..{} is outside text of {} chars",
                    span.start,
                    span.end,
                    map.char_len()
                ))
            })?;

        pieces.push(&text[end..tail]);
        pieces.push(Placeholders::for_kind(span.kind));
        entries.push(ReportEntry {
            kind: span.kind,
            source: span.source,
            char_count_removed: span.len(),
            start: span.start,
            end: span.end,
            stage,
        });
        tail = start;
    }
    pieces.push(&text[..tail]);

    let capacity = pieces.iter().map(|p| p.len()).sum();
    let mut output = String::with_capacity(capacity);
    for piece in pieces.iter().rev() {
        output.push_str(piece);
    }

    Ok(Rewrite {
        text: output,
        entries,
    })
}
