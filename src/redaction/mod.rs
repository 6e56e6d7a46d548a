//! PII redaction pipeline
//!
//! Free text goes through two stages:
//! - **Patterns**: email and phone matchers on the original text
//! - **Entities**: a statistical recognizer on the stage-1 output
//!
//! Each stage resolves overlapping spans into a non-overlapping list and
//! rewrites the text right to left with fixed placeholders. The result is the
//! sanitized text plus a [`RedactionReport`] that records kinds and positions,
//! never the removed content.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pii_redactor::config::RedactorConfig;
//! use pii_redactor::redaction::RedactionEngine;
//!
//! # fn example() -> pii_redactor::domain::Result<()> {
//! let engine = RedactionEngine::from_config(&RedactorConfig::default())?;
//! let outcome = engine.redact("John lives in Boston", &engine.default_options())?;
//! println!("{}", outcome.sanitized_text);
//! # Ok(())
//! # }
//! ```

pub mod anonymizer;
pub mod audit;
pub mod detector;
pub mod engine;
pub mod models;
pub mod options;
pub mod recognizer;
pub mod report;
pub mod resolver;
pub mod text;

// Re-export main types
pub use engine::{RedactionEngine, RedactionOutcome};
pub use models::{DetectionSource, EntityKind, Span};
pub use options::RedactOptions;
pub use report::{NlpStatus, RedactionReport, RedactionStage, ReportEntry};
