//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the redactor using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// pii-redactor - strip PII from clinical and messaging text
#[derive(Parser, Debug)]
#[command(name = "pii-redactor")]
#[command(version, about, long_about = None)]
#[command(author = "PII Redactor Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pii-redactor.toml", env = "REDACTOR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "REDACTOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact a file or standard input and print the result
    Redact(commands::redact::RedactArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
