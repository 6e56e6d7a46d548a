//! Logging and observability
//!
//! Structured logging through `tracing`, plus macros that give redaction events
//! a consistent set of fields. Log events carry kinds, counts, offsets and
//! timings only, never the text being redacted.
//!
//! # Example
//!
//! ```no_run
//! use pii_redactor::logging::init_logging;
//! use pii_redactor::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Redactor started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the completion of a redaction call
///
/// # Example
///
/// ```no_run
/// use pii_redactor::log_redaction_complete;
/// use std::time::Duration;
///
/// log_redaction_complete!(3, 42, "completed", Duration::from_millis(4));
/// ```
#[macro_export]
macro_rules! log_redaction_complete {
    ($replacements:expr, $chars_removed:expr, $nlp_status:expr, $duration:expr) => {
        tracing::debug!(
            replacements = $replacements,
            chars_removed = $chars_removed,
            nlp_status = %$nlp_status,
            duration_ms = $duration.as_millis() as u64,
            "Redaction completed"
        );
    };
}

/// Log that entity recognition was skipped for a call
///
/// # Example
///
/// ```no_run
/// use pii_redactor::log_stage_skipped;
///
/// log_stage_skipped!("timed_out", 250);
/// ```
#[macro_export]
macro_rules! log_stage_skipped {
    ($reason:expr, $budget_ms:expr) => {
        tracing::warn!(
            reason = %$reason,
            budget_ms = $budget_ms,
            "Entity recognition skipped, returning pattern-stage result"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use pii_redactor::log_error_with_context;
/// use pii_redactor::domain::RedactorError;
///
/// let error = RedactorError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let error = crate::domain::RedactorError::InvalidInput("not text".to_string());
        crate::log_redaction_complete!(2usize, 31usize, "completed", Duration::from_millis(3));
        crate::log_stage_skipped!("cancelled", 100u64);
        crate::log_error_with_context!(&error, "redact");
    }
}
