//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::RedactorConfig;
use crate::domain::errors::RedactorError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RedactorConfig
/// 4. Applies environment variable overrides (REDACTOR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use pii_redactor::config::loader::load_config;
///
/// let config = load_config("pii-redactor.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RedactorConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RedactorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RedactorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Loads configuration from a file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<RedactorConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = RedactorConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML content
pub fn parse_config(contents: &str) -> Result<RedactorConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RedactorConfig = toml::from_str(&contents)
        .map_err(|e| RedactorError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &RedactorConfig) -> Result<()> {
    config.validate().map_err(|e| {
        RedactorError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RedactorError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RedactorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        RedactorError::Configuration(format!("Invalid value '{raw}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using the REDACTOR_* prefix
///
/// Variables follow the pattern REDACTOR_<SECTION>_<KEY>, for example
/// `REDACTOR_REDACTION_ENABLE_NLP` or `REDACTOR_AUDIT_LOG_PATH`.
fn apply_env_overrides(config: &mut RedactorConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("REDACTOR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Redaction overrides
    if let Ok(val) = std::env::var("REDACTOR_REDACTION_ENABLE_REGEX") {
        config.redaction.enable_regex = parse_env("REDACTOR_REDACTION_ENABLE_REGEX", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_REDACTION_ENABLE_NLP") {
        config.redaction.enable_nlp = parse_env("REDACTOR_REDACTION_ENABLE_NLP", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_REDACTION_MIN_CONFIDENCE") {
        config.redaction.min_confidence = parse_env("REDACTOR_REDACTION_MIN_CONFIDENCE", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_REDACTION_MAX_INPUT_CHARS") {
        config.redaction.max_input_chars = parse_env("REDACTOR_REDACTION_MAX_INPUT_CHARS", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_REDACTION_NLP_TIMEOUT_MS") {
        config.redaction.nlp_timeout_ms =
            Some(parse_env("REDACTOR_REDACTION_NLP_TIMEOUT_MS", &val)?);
    }

    // Recognizer overrides
    if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_MODEL_PATH") {
        config.recognizer.model_path = Some(val.into());
    }
    if let Ok(val) = std::env::var("REDACTOR_RECOGNIZER_EAGER_LOAD") {
        config.recognizer.eager_load = parse_env("REDACTOR_RECOGNIZER_EAGER_LOAD", &val)?;
    }

    // Audit overrides
    if let Ok(val) = std::env::var("REDACTOR_AUDIT_ENABLED") {
        config.audit.enabled = parse_env("REDACTOR_AUDIT_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("REDACTOR_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("REDACTOR_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("REDACTOR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
