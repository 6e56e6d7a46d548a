//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use pii_redactor::config::{load_config, load_config_or_default};
use pii_redactor::domain::RedactorError;
use pii_redactor::redaction::{NlpStatus, RedactionEngine};
use std::io::Write;
use std::sync::Mutex;
use tempfile::{tempdir, NamedTempFile};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for name in [
        "REDACTOR_APPLICATION_LOG_LEVEL",
        "REDACTOR_REDACTION_ENABLE_NLP",
        "REDACTOR_REDACTION_MIN_CONFIDENCE",
        "REDACTOR_REDACTION_NLP_TIMEOUT_MS",
        "REDACTOR_AUDIT_ENABLED",
        "TEST_REDACTOR_MODEL_DIR",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[redaction]
enable_regex = true
enable_nlp = false
min_confidence = 0.75
max_input_chars = 5000
backtrack_limit = 20000
nlp_timeout_ms = 250

[recognizer]
eager_load = false

[audit]
enabled = false
log_path = "/tmp/redactor/audit.log"
json_format = false

[logging]
local_enabled = false
local_path = "/tmp/redactor"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert!(!config.redaction.enable_nlp);
    assert_eq!(config.redaction.min_confidence, 0.75);
    assert_eq!(config.redaction.max_input_chars, 5000);
    assert_eq!(config.redaction.backtrack_limit, 20000);
    assert_eq!(config.redaction.nlp_timeout_ms, Some(250));
    assert!(!config.recognizer.eager_load);
    assert!(!config.audit.json_format);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();
    assert!(config.redaction.enable_regex);
    assert!(config.redaction.enable_nlp);
    assert_eq!(config.redaction.max_input_chars, 100_000);
    assert!(config.recognizer.model_path.is_none());
    assert!(!config.audit.enabled);
}

#[test]
fn test_missing_file_is_an_error_but_default_loader_falls_back() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let path = "/nonexistent/pii-redactor.toml";
    assert!(matches!(
        load_config(path).unwrap_err(),
        RedactorError::Configuration(_)
    ));
    let config = load_config_or_default(path).unwrap();
    assert!(config.redaction.enable_nlp);
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("REDACTOR_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("REDACTOR_REDACTION_ENABLE_NLP", "false");
    std::env::set_var("REDACTOR_REDACTION_MIN_CONFIDENCE", "0.4");
    std::env::set_var("REDACTOR_REDACTION_NLP_TIMEOUT_MS", "100");

    let file = write_config("[redaction]\nenable_nlp = true\nmin_confidence = 0.9\n");
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert!(!config.redaction.enable_nlp);
    assert_eq!(config.redaction.min_confidence, 0.4);
    assert_eq!(config.redaction.nlp_timeout_ms, Some(100));
}

#[test]
fn test_invalid_env_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("REDACTOR_AUDIT_ENABLED", "sometimes");
    let result = load_config_or_default("/nonexistent/pii-redactor.toml");
    cleanup_env_vars();

    assert!(matches!(result.unwrap_err(), RedactorError::Configuration(_)));
}

#[test]
fn test_env_substitution_in_model_path() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("tiny.toml"),
        "[model]\nname = \"tiny\"\n\n[lexicon]\nlocation = [\"springfield\"]\n",
    )
    .unwrap();
    std::env::set_var("TEST_REDACTOR_MODEL_DIR", dir.path());

    let file = write_config("[recognizer]\nmodel_path = \"${TEST_REDACTOR_MODEL_DIR}/tiny.toml\"\n");
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(
        config.recognizer.model_path.as_deref(),
        Some(dir.path().join("tiny.toml").as_path())
    );

    let engine = RedactionEngine::from_config(&config).unwrap();
    let outcome = engine
        .redact("Moved to Springfield", &engine.default_options())
        .unwrap();
    assert_eq!(outcome.sanitized_text, "Moved to [Redacted PII]");
    assert_eq!(outcome.nlp_status, NlpStatus::Completed);
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[recognizer]\nmodel_path = \"${TEST_REDACTOR_MODEL_DIR}/m.toml\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_REDACTOR_MODEL_DIR"));
}

#[test_case::test_case("[redaction]\nmin_confidence = 1.5\n" ; "confidence out of range")]
#[test_case::test_case("[redaction]\nmax_input_chars = 0\n" ; "zero length bound")]
#[test_case::test_case("[logging]\nlocal_rotation = \"size\"\n" ; "unknown rotation")]
#[test_case::test_case("[application]\nlog_level = \"loud\"\n" ; "unknown log level")]
#[test_case::test_case("[redaction\nenable_nlp = true\n" ; "malformed toml")]
fn test_invalid_config_is_rejected(content: &str) {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(content);
    assert!(matches!(
        load_config(file.path()).unwrap_err(),
        RedactorError::Configuration(_)
    ));
}

#[test]
fn test_missing_model_file_surfaces_as_model_unavailable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[recognizer]\nmodel_path = \"/nonexistent/model.toml\"\n");
    let config = load_config(file.path()).unwrap();
    let engine = RedactionEngine::from_config(&config).unwrap();

    let err = engine
        .redact("John lives in Boston", &engine.default_options())
        .unwrap_err();
    assert!(matches!(err, RedactorError::ModelUnavailable(_)));
}
