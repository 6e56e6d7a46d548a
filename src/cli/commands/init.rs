//! Init command implementation
//!
//! Writes a commented sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Sample configuration written by `init`
pub const SAMPLE_CONFIG: &str = r#"# pii-redactor configuration
#
# Every setting is optional. Values of the form ${VAR} are read from the
# environment, and REDACTOR_<SECTION>_<KEY> variables override this file.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[redaction]
# Stage 1: email and phone matchers
enable_regex = true
# Stage 2: entity recognition on the stage-1 output
enable_nlp = true
# Drop recognizer hits below this confidence (0.0 keeps everything)
min_confidence = 0.0
# Longer input is refused
max_input_chars = 100000
# Backtracking budget of the formatted phone pattern
backtrack_limit = 1000000
# Budget for entity recognition; when it runs out the pattern-stage
# result is returned and flagged
# nlp_timeout_ms = 250

[recognizer]
# Lexicon model file; the bundled model is used when unset
# model_path = "${REDACTOR_MODEL_DIR}/gazetteer.toml"
# Load the model at startup instead of on first use
eager_load = true

[audit]
# One record per call with counts only, never the text
enabled = false
log_path = "./audit/redaction_audit.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "pii-redactor.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: pii-redactor validate-config");
                println!("  3. Redact a file: pii-redactor redact note.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }
}
