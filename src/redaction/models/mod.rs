//! Data models for the redaction pipeline

pub mod span;

pub use span::{DetectionSource, EntityKind, Span};
