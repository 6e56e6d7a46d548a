//! Configuration management for the redactor.
//!
//! # Overview
//!
//! The redactor reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `REDACTOR_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Per-section validation
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`RedactionConfig`] - Pipeline defaults and input bounds
//! - [`RecognizerConfig`] - Entity recognizer model
//! - [`AuditConfig`] - Audit trail
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [redaction]
//! enable_regex = true
//! enable_nlp = true
//! min_confidence = 0.6
//! max_input_chars = 100000
//! nlp_timeout_ms = 250
//!
//! [recognizer]
//! model_path = "${REDACTOR_MODEL_DIR}/gazetteer.toml"
//! eager_load = true
//!
//! [audit]
//! enabled = true
//! log_path = "/var/log/pii-redactor/audit.log"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pii_redactor::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pii-redactor.toml")?;
//! println!("NLP enabled: {}", config.redaction.enable_nlp);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, parse_config};
pub use schema::{
    ApplicationConfig, AuditConfig, LoggingConfig, RecognizerConfig, RedactionConfig,
    RedactorConfig,
};
