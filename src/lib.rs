// pii-redactor - Two-stage PII redaction for clinical and messaging text
// Copyright (c) 2025 PII Redactor Contributors
// Licensed under the MIT License

//! # pii-redactor
//!
//! Strips personally identifiable information from free text before it is
//! stored, displayed or forwarded.
//!
//! ## Overview
//!
//! Redaction runs in two stages:
//! - **Patterns**: deterministic matchers for email addresses and North
//!   American phone numbers, replaced with `[REDACTED EMAIL]` and
//!   `[REDACTED PHONE]`
//! - **Entities**: a statistical named-entity recognizer run on the stage-1
//!   output; people, places, organizations and other names become
//!   `[Redacted PII]`
//!
//! The engine only classifies and replaces text. What happens to the result is
//! up to the caller.
//!
//! ## Architecture
//!
//! - [`redaction`] - The pipeline: matchers, resolver, recognizer, rewrite, report
//! - [`domain`] - Error type and result alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pii_redactor::config::RedactorConfig;
//! use pii_redactor::redaction::{RedactOptions, RedactionEngine};
//!
//! # fn example() -> pii_redactor::domain::Result<()> {
//! let engine = RedactionEngine::from_config(&RedactorConfig::default())?;
//!
//! let outcome = engine.redact(
//!     "Dr. Okonkwo can be reached at (555) 123-4567",
//!     &RedactOptions::default(),
//! )?;
//! println!("{}", outcome.sanitized_text);
//! for entry in outcome.report.entries() {
//!     println!("{:?} {} via {}", entry.stage, entry.kind, entry.source);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`domain::RedactorError`]. A failed call never returns
//! partially redacted text:
//!
//! ```rust,no_run
//! use pii_redactor::domain::RedactorError;
//! # use pii_redactor::redaction::{RedactOptions, RedactionEngine};
//! # fn example(engine: &RedactionEngine, bytes: &[u8]) {
//! match engine.redact_bytes(bytes, &RedactOptions::default()) {
//!     Ok(outcome) => println!("{}", outcome.sanitized_text),
//!     Err(RedactorError::ModelUnavailable(reason)) => eprintln!("no model: {reason}"),
//!     Err(e) => eprintln!("refused: {e}"),
//! }
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod redaction;
