//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main redactor configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactorConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Pipeline defaults
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Entity recognizer model
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Audit trail
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RedactorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.redaction.validate()?;
        self.recognizer.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Pipeline defaults applied when a call does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Run the pattern matchers
    #[serde(default = "default_true")]
    pub enable_regex: bool,

    /// Run entity recognition
    #[serde(default = "default_true")]
    pub enable_nlp: bool,

    /// Recognizer confidence threshold (0.0 keeps every hit)
    #[serde(default)]
    pub min_confidence: f32,

    /// Longest accepted input, in chars
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Backtracking budget of the phone pattern
    #[serde(default = "default_backtrack_limit")]
    pub backtrack_limit: usize,

    /// Budget for entity recognition in the async entry point
    #[serde(default)]
    pub nlp_timeout_ms: Option<u64>,
}

impl RedactionConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "redaction.min_confidence must be between 0.0 and 1.0, got {}",
                self.min_confidence
            ));
        }
        if self.max_input_chars == 0 {
            return Err("redaction.max_input_chars must be > 0".to_string());
        }
        if self.backtrack_limit == 0 {
            return Err("redaction.backtrack_limit must be > 0".to_string());
        }
        if self.nlp_timeout_ms == Some(0) {
            return Err("redaction.nlp_timeout_ms must be > 0 when set".to_string());
        }
        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enable_regex: true,
            enable_nlp: true,
            min_confidence: 0.0,
            max_input_chars: default_max_input_chars(),
            backtrack_limit: default_backtrack_limit(),
            nlp_timeout_ms: None,
        }
    }
}

/// Entity recognizer model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Model file; the bundled model is used when unset
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Load the model when the engine is built instead of on first use
    #[serde(default = "default_true")]
    pub eager_load: bool,
}

impl RecognizerConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.model_path {
            if path.as_os_str().is_empty() {
                return Err("recognizer.model_path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            eager_load: true,
        }
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Write one audit record per call
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// JSON lines (true) or plain text (false)
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.file_name().is_none() {
            return Err(format!(
                "audit.log_path '{}' must name a file",
                self.log_path.display()
            ));
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_input_chars() -> usize {
    100_000
}

fn default_backtrack_limit() -> usize {
    1_000_000
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/redaction_audit.log")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
