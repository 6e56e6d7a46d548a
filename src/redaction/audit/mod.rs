//! Audit logging module
//!
//! One record per redaction call, written off the caller's thread.

pub mod logger;

pub use logger::{AuditLogger, AuditRecord};
