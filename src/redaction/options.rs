//! Per-call redaction options

use crate::config::RedactionConfig;
use crate::domain::{RedactorError, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Options for a single `redact` call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactOptions {
    /// Run stage 1 (pattern matchers)
    pub enable_regex: bool,

    /// Run stage 2 (entity recognition)
    pub enable_nlp: bool,

    /// Recognizer hits below this confidence are dropped
    pub min_confidence: f32,

    /// Skip stage 2 if this instant has passed when stage 1 finishes
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            enable_regex: true,
            enable_nlp: true,
            min_confidence: 0.0,
            deadline: None,
        }
    }
}

impl RedactOptions {
    /// Options with only the pattern matchers enabled
    pub fn regex_only() -> Self {
        Self {
            enable_nlp: false,
            ..Self::default()
        }
    }

    /// Options with only entity recognition enabled
    pub fn nlp_only() -> Self {
        Self {
            enable_regex: false,
            ..Self::default()
        }
    }

    /// Set the confidence threshold
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set a deadline `budget` from now
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.deadline = Instant::now().checked_add(budget);
        self
    }

    /// Check whether the deadline has passed
    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(RedactorError::InvalidInput(format!(
                "min_confidence must be within 0.0..=1.0, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

impl From<&RedactionConfig> for RedactOptions {
    fn from(config: &RedactionConfig) -> Self {
        Self {
            enable_regex: config.enable_regex,
            enable_nlp: config.enable_nlp,
            min_confidence: config.min_confidence,
            deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RedactOptions::default();
        assert!(options.enable_regex);
        assert!(options.enable_nlp);
        assert_eq!(options.min_confidence, 0.0);
        assert!(options.deadline.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_min_confidence_out_of_range() {
        for value in [-0.1, 1.5, f32::NAN] {
            let options = RedactOptions::default().with_min_confidence(value);
            assert!(matches!(
                options.validate(),
                Err(RedactorError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_deadline() {
        let options = RedactOptions::default().with_budget(Duration::ZERO);
        assert!(options.deadline_passed());
        let options = RedactOptions::default().with_budget(Duration::from_secs(3600));
        assert!(!options.deadline_passed());
    }

    #[test]
    fn test_partial_deserialization() {
        let options: RedactOptions = serde_json::from_str(r#"{"enable_nlp": false}"#).unwrap();
        assert!(options.enable_regex);
        assert!(!options.enable_nlp);
    }
}
