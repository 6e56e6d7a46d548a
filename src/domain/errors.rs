//! Domain error types
//!
//! This module defines the error hierarchy for the redactor. All errors are
//! domain-specific and don't expose third-party types. Error messages never
//! carry the text being redacted.

use thiserror::Error;

/// Main redactor error type
///
/// Every failure of a redaction call surfaces as one of these variants. Callers
/// must treat any of them as "do not release this text".
#[derive(Debug, Error)]
pub enum RedactorError {
    /// The input was not text (non-UTF-8 bytes, a non-string JSON value) or
    /// exceeded the configured length bound
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity recognition was requested but the model could not be loaded
    #[error("Entity recognizer unavailable: {0}")]
    ModelUnavailable(String),

    /// A pattern matcher failed internally (e.g. backtracking budget exhausted)
    #[error("Pattern fault in {matcher} matcher: {message}")]
    PatternFault {
        /// Name of the failing matcher
        matcher: &'static str,
        /// Description of the fault
        message: String,
    },

    /// The recognizer returned malformed spans or its inference task died
    #[error("Recognizer fault: {0}")]
    RecognizerFault(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RedactorError {
    /// Builds a [`RedactorError::PatternFault`] for the named matcher
    pub fn pattern_fault(matcher: &'static str, message: impl Into<String>) -> Self {
        Self::PatternFault {
            matcher,
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::PatternFault { .. } => "pattern_fault",
            Self::RecognizerFault(_) => "recognizer_fault",
            Self::Configuration(_) => "configuration",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RedactorError {
    fn from(err: std::io::Error) -> Self {
        RedactorError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RedactorError {
    fn from(err: serde_json::Error) -> Self {
        RedactorError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RedactorError {
    fn from(err: toml::de::Error) -> Self {
        RedactorError::Configuration(format!("TOML parse error: {err}"))
    }
}
