//! Redact command implementation
//!
//! Reads text from a file or stdin, redacts it and writes the result to
//! stdout. Diagnostics go to stderr. When redaction fails or is interrupted
//! nothing is written to stdout.

use crate::config::load_config_or_default;
use crate::domain::RedactorError;
use crate::redaction::{NlpStatus, RedactionEngine, RedactionOutcome};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;

/// Exit code after an interrupt
pub const EXIT_CANCELLED: i32 = 130;

/// Output format of the redact command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Redacted text only
    Text,
    /// Redacted text, report and NLP status as JSON
    Json,
}

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Input file (reads stdin when omitted or "-")
    pub input: Option<PathBuf>,

    /// Skip the email and phone matchers
    #[arg(long)]
    pub no_regex: bool,

    /// Skip entity recognition
    #[arg(long)]
    pub no_nlp: bool,

    /// Drop recognizer hits below this confidence (0.0-1.0)
    #[arg(long)]
    pub min_confidence: Option<f32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Budget for entity recognition in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the redaction report to stderr (text format only)
    #[arg(long)]
    pub report: bool,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(
        &self,
        config_path: &str,
        cancel: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let engine = match RedactionEngine::from_config(&config) {
            Ok(engine) => engine,
            Err(e @ RedactorError::Configuration(_)) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
            Err(e) => return Err(e.into()),
        };

        let mut options = engine.default_options();
        if self.no_regex {
            options.enable_regex = false;
        }
        if self.no_nlp {
            options.enable_nlp = false;
        }
        if let Some(min_confidence) = self.min_confidence {
            options.min_confidence = min_confidence;
        }

        let mut input_cancel = cancel.clone();
        let input = tokio::select! {
            biased;
            _ = wait_for_cancel(&mut input_cancel) => {
                eprintln!("Cancelled before redaction");
                return Ok(EXIT_CANCELLED);
            }
            read = self.read_input() => read?,
        };
        let budget = self
            .timeout_ms
            .map(Duration::from_millis)
            .or_else(|| engine.nlp_timeout())
            .unwrap_or(Duration::MAX);

        let result = match std::str::from_utf8(&input) {
            Ok(text) => {
                engine
                    .redact_with_deadline(text, &options, budget, cancel)
                    .await
            }
            // The byte entry point reports non-UTF-8 input as InvalidInput
            Err(_) => engine.redact_bytes(&input, &options),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Redaction refused ({}): {e}", e.kind());
                return Ok(3);
            }
        };

        if outcome.nlp_status == NlpStatus::Cancelled {
            eprintln!("Cancelled during entity recognition, no output written");
            return Ok(EXIT_CANCELLED);
        }

        if outcome.nlp_status.is_skipped() {
            eprintln!(
                "Warning: entity recognition skipped ({}), only emails and phone numbers were redacted",
                outcome.nlp_status
            );
        }

        self.write_output(&outcome)?;
        Ok(0)
    }

    async fn read_input(&self) -> anyhow::Result<Vec<u8>> {
        match self.input.as_deref() {
            Some(path) if path != Path::new("-") => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read input file {}", path.display())),
            _ => {
                let mut buffer = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buffer)
                    .await
                    .context("Failed to read standard input")?;
                Ok(buffer)
            }
        }
    }

    fn write_output(&self, outcome: &RedactionOutcome) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        match self.format {
            OutputFormat::Text => {
                stdout
                    .write_all(outcome.sanitized_text.as_bytes())
                    .context("Failed to write output")?;
                if self.report {
                    eprint!("{}", outcome.report.format_console());
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(outcome)
                    .context("Failed to serialize redaction outcome")?;
                writeln!(stdout, "{json}").context("Failed to write output")?;
            }
        }
        stdout.flush().context("Failed to flush output")?;
        Ok(())
    }
}

/// Resolve once the flag is raised; never resolves if the sender is gone
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    let sender_gone = cancel.wait_for(|cancelled| *cancelled).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}
