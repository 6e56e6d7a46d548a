//! Validate config command implementation
//!
//! Loads the configuration file and, when one is configured, the recognizer
//! model, and prints a summary.

use crate::config::load_config;
use crate::redaction::recognizer::{EntityRecognizer, GazetteerRecognizer};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also load the recognizer model
    #[arg(long)]
    pub check_model: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if self.check_model || config.recognizer.model_path.is_some() {
            let loaded = match &config.recognizer.model_path {
                Some(path) => GazetteerRecognizer::from_file(path),
                None => GazetteerRecognizer::bundled(),
            };
            match loaded {
                Ok(model) => {
                    println!("✅ Recognizer model loaded: {}", model.name());
                    if let Some(fingerprint) = model.fingerprint() {
                        println!("   Fingerprint: {fingerprint}");
                    }
                }
                Err(e) => {
                    println!("❌ Failed to load recognizer model");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        }

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Pattern Matchers: {}", enabled(config.redaction.enable_regex));
        println!("  Entity Recognition: {}", enabled(config.redaction.enable_nlp));
        println!("  Min Confidence: {}", config.redaction.min_confidence);
        println!("  Max Input Chars: {}", config.redaction.max_input_chars);
        match config.redaction.nlp_timeout_ms {
            Some(ms) => println!("  NLP Timeout: {ms} ms"),
            None => println!("  NLP Timeout: none"),
        }
        match &config.recognizer.model_path {
            Some(path) => println!("  Model: {}", path.display()),
            None => println!("  Model: bundled"),
        }
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.log_path.display());
        } else {
            println!("  Audit Log: disabled");
        }
        println!();
        Ok(0)
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
