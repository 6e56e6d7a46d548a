//! Span resolution
//!
//! Merges spans from several detectors into one ordered, non-overlapping list.
//! Candidates are ordered by start, then longest first, then by source priority
//! (pattern matches outrank recognizer hits), then by kind for determinism. A
//! left-to-right sweep keeps a candidate only if it starts at or after the end
//! of the last accepted span.

use crate::redaction::models::Span;
use std::cmp::Ordering;

/// Resolve overlapping spans
///
/// The result is sorted by `start` and satisfies
/// `spans[i].end <= spans[j].start` for every `i < j`. Empty spans are dropped.
pub fn resolve(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|s| !s.is_empty());
    spans.sort_by(candidate_order);

    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match accepted.last() {
            Some(last) if span.start < last.end => {
                tracing::trace!(
                    start = span.start,
                    end = span.end,
                    kind = %span.kind,
                    kept_start = last.start,
                    kept_end = last.end,
                    "Discarding overlapping span"
                );
            }
            _ => accepted.push(span),
        }
    }
    accepted
}

fn candidate_order(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| b.source.priority().cmp(&a.source.priority()))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
}

/// Check the non-overlap invariant of a resolved list
pub fn is_resolved(spans: &[Span]) -> bool {
    spans
        .windows(2)
        .all(|w| w[0].start < w[0].end && w[0].end <= w[1].start)
}
