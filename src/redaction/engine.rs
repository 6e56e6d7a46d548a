//! Redaction engine
//!
//! [`RedactionEngine`] runs the two-stage pipeline:
//!
//! 1. Every pattern matcher on the original text, resolve, rewrite.
//! 2. The entity recognizer on the stage-1 output, widen each span to the
//!    word it sits in, resolve, rewrite.
//!
//! Any failure aborts the whole call; a partially redacted text is never
//! returned. The engine holds no per-call state, so one instance can serve
//! many threads at once.
//!
//! # Examples
//!
//! ```no_run
//! use pii_redactor::redaction::{RedactionEngine, RedactOptions};
//! use pii_redactor::redaction::recognizer::{GazetteerRecognizer, ModelHandle};
//! use std::sync::Arc;
//!
//! # fn example() -> pii_redactor::domain::Result<()> {
//! let model = Arc::new(ModelHandle::eager(|| {
//!     Ok(Arc::new(GazetteerRecognizer::bundled()?) as _)
//! }));
//! let engine = RedactionEngine::new(model)?;
//!
//! let outcome = engine.redact("Call (123) 456-7890", &RedactOptions::regex_only())?;
//! assert_eq!(outcome.sanitized_text, "Call [REDACTED PHONE]");
//! # Ok(())
//! # }
//! ```

use crate::config::RedactorConfig;
use crate::domain::{RedactorError, Result};
use crate::redaction::anonymizer::{apply_replacements, Placeholders, Rewrite};
use crate::redaction::audit::{AuditLogger, AuditRecord};
use crate::redaction::detector::{default_matchers, EmailMatcher, PatternMatcher, PhoneMatcher};
use crate::redaction::options::RedactOptions;
use crate::redaction::recognizer::{
    EntityRecognizer, GazetteerRecognizer, ModelHandle, RecognizerAdapter,
};
use crate::redaction::report::{NlpStatus, RedactionReport, RedactionStage};
use crate::redaction::resolver::resolve;
use crate::redaction::text::{OffsetMap, WordEdges};
use crate::{log_error_with_context, log_redaction_complete, log_stage_skipped};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Default bound on input length, in chars
pub const DEFAULT_MAX_INPUT_CHARS: usize = 100_000;

/// Result of a successful redaction call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionOutcome {
    /// The redacted text
    pub sanitized_text: String,
    /// What was replaced, in application order
    pub report: RedactionReport,
    /// Whether entity recognition ran
    pub nlp_status: NlpStatus,
}

/// Two-stage redaction engine
pub struct RedactionEngine {
    matchers: Arc<Vec<Box<dyn PatternMatcher>>>,
    word_edges: WordEdges,
    model: Arc<ModelHandle>,
    max_input_chars: usize,
    defaults: RedactOptions,
    nlp_timeout: Option<Duration>,
    audit_logger: Option<AuditLogger>,
}

impl RedactionEngine {
    /// Create an engine with the built-in matchers and the given model handle
    pub fn new(model: Arc<ModelHandle>) -> Result<Self> {
        Ok(Self {
            matchers: Arc::new(default_matchers()?),
            word_edges: WordEdges::new()?,
            model,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            defaults: RedactOptions::default(),
            nlp_timeout: None,
            audit_logger: None,
        })
    }

    /// Create an engine from configuration
    ///
    /// Builds the matchers with the configured backtracking budget, a model
    /// handle for the configured (or bundled) model, and the audit logger if
    /// enabled. With `eager_load` the model is loaded here; a load failure is
    /// kept and reported as [`RedactorError::ModelUnavailable`] by calls that
    /// need entity recognition.
    pub fn from_config(config: &RedactorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| RedactorError::Configuration(format!("Invalid configuration: {e}")))?;

        let matchers: Vec<Box<dyn PatternMatcher>> = vec![
            Box::new(EmailMatcher::new()?),
            Box::new(PhoneMatcher::with_backtrack_limit(
                config.redaction.backtrack_limit,
            )?),
        ];

        let model_path = config.recognizer.model_path.clone();
        let loader = move || -> Result<Arc<dyn EntityRecognizer>> {
            let recognizer = match &model_path {
                Some(path) => GazetteerRecognizer::from_file(path)?,
                None => GazetteerRecognizer::bundled()?,
            };
            Ok(Arc::new(recognizer))
        };
        let model = if config.recognizer.eager_load {
            ModelHandle::eager(loader)
        } else {
            ModelHandle::lazy(loader)
        };

        Ok(Self {
            matchers: Arc::new(matchers),
            word_edges: WordEdges::new()?,
            model: Arc::new(model),
            max_input_chars: config.redaction.max_input_chars,
            defaults: RedactOptions::from(&config.redaction),
            nlp_timeout: config.redaction.nlp_timeout_ms.map(Duration::from_millis),
            audit_logger: AuditLogger::from_config(&config.audit)?,
        })
    }

    /// Attach an audit logger
    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Replace the pattern matchers
    pub fn with_matchers(mut self, matchers: Vec<Box<dyn PatternMatcher>>) -> Self {
        self.matchers = Arc::new(matchers);
        self
    }

    /// Set the input length bound, in chars
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Options taken from configuration
    pub fn default_options(&self) -> RedactOptions {
        self.defaults.clone()
    }

    /// Configured budget for entity recognition in [`Self::redact_with_deadline`]
    pub fn nlp_timeout(&self) -> Option<Duration> {
        self.nlp_timeout
    }

    /// The model handle
    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Redact `text`
    ///
    /// # Errors
    ///
    /// - [`RedactorError::InvalidInput`] for over-long input or invalid options
    /// - [`RedactorError::ModelUnavailable`] when NLP is enabled but the model
    ///   failed to load
    /// - [`RedactorError::PatternFault`] / [`RedactorError::RecognizerFault`]
    ///   when a detector fails
    pub fn redact(&self, text: &str, options: &RedactOptions) -> Result<RedactionOutcome> {
        let started = Instant::now();
        let result = self.redact_sync(text, options, started);
        if let Err(e) = &result {
            log_error_with_context!(e, "redact");
        }
        result
    }

    /// Redact raw bytes, which must be UTF-8 text
    pub fn redact_bytes(&self, input: &[u8], options: &RedactOptions) -> Result<RedactionOutcome> {
        let text = std::str::from_utf8(input).map_err(|e| {
            RedactorError::InvalidInput(format!(
                "input is not valid UTF-8 (error at byte {})",
                e.valid_up_to()
            ))
        })?;
        self.redact(text, options)
    }

    /// Redact a JSON value, which must be a string
    pub fn redact_json(&self, input: &Value, options: &RedactOptions) -> Result<RedactionOutcome> {
        let text = input.as_str().ok_or_else(|| {
            RedactorError::InvalidInput(format!(
                "expected a JSON string, got {}",
                json_type_name(input)
            ))
        })?;
        self.redact(text, options)
    }

    /// Redact `text` with a time budget and a cancellation signal for stage 2
    ///
    /// Both stages run on the blocking pool. Stage 1 always completes; if
    /// `budget` elapses (or `options.deadline` passes) before stage 2, or
    /// `cancel` flips to `true`, the stage-1 result is returned with
    /// [`NlpStatus::TimedOut`] or [`NlpStatus::Cancelled`]. An abandoned
    /// recognizer run finishes in the background and its result is dropped.
    pub async fn redact_with_deadline(
        &self,
        text: &str,
        options: &RedactOptions,
        budget: Duration,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<RedactionOutcome> {
        let started = Instant::now();
        let result = self
            .redact_async(text, options, budget, &mut cancel, started)
            .await;
        if let Err(e) = &result {
            log_error_with_context!(e, "redact_with_deadline");
        }
        result
    }

    async fn redact_async(
        &self,
        text: &str,
        options: &RedactOptions,
        budget: Duration,
        cancel: &mut watch::Receiver<bool>,
        started: Instant,
    ) -> Result<RedactionOutcome> {
        self.check_input(text, options)?;
        let recognizer = self.recognizer_for(options)?;

        let matchers = Arc::clone(&self.matchers);
        let owned = text.to_string();
        let enable_regex = options.enable_regex;
        let (stage1, mut report) =
            tokio::task::spawn_blocking(move || pattern_stage(&matchers, &owned, enable_regex))
                .await
                .map_err(|e| {
                    RedactorError::pattern_fault("patterns", format!("pattern task failed: {e}"))
                })??;

        let Some(recognizer) = recognizer else {
            return Ok(self.finish(stage1.text, report, NlpStatus::Disabled, None, started));
        };
        let fingerprint = recognizer.fingerprint().map(str::to_string);

        let budget = match options.deadline {
            Some(deadline) => budget.min(deadline.saturating_duration_since(Instant::now())),
            None => budget,
        };
        let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);

        if *cancel.borrow_and_update() {
            log_stage_skipped!(NlpStatus::Cancelled, budget_ms);
            return Ok(self.finish(stage1.text, report, NlpStatus::Cancelled, None, started));
        }

        let adapter = RecognizerAdapter::new(recognizer, options.min_confidence);
        let edges = self.word_edges.clone();
        let stage_input = stage1.text.clone();
        let task =
            tokio::task::spawn_blocking(move || entity_stage(&adapter, &edges, &stage_input));

        let status = tokio::select! {
            joined = tokio::time::timeout(budget, task) => match joined {
                Ok(Ok(rewrite)) => {
                    let rewrite = rewrite?;
                    report.extend(rewrite.entries);
                    return Ok(self.finish(
                        rewrite.text,
                        report,
                        NlpStatus::Completed,
                        fingerprint.as_deref(),
                        started,
                    ));
                }
                Ok(Err(join_error)) => {
                    return Err(RedactorError::RecognizerFault(format!(
                        "recognizer task failed: {join_error}"
                    )));
                }
                Err(_) => NlpStatus::TimedOut,
            },
            _ = cancelled(cancel) => NlpStatus::Cancelled,
        };

        log_stage_skipped!(status, budget_ms);
        Ok(self.finish(stage1.text, report, status, None, started))
    }

    fn redact_sync(
        &self,
        text: &str,
        options: &RedactOptions,
        started: Instant,
    ) -> Result<RedactionOutcome> {
        self.check_input(text, options)?;
        let recognizer = self.recognizer_for(options)?;
        let (stage1, mut report) = pattern_stage(&self.matchers, text, options.enable_regex)?;

        match recognizer {
            None => Ok(self.finish(stage1.text, report, NlpStatus::Disabled, None, started)),
            Some(_) if options.deadline_passed() => {
                log_stage_skipped!(NlpStatus::DeadlineExceeded, 0u64);
                Ok(self.finish(
                    stage1.text,
                    report,
                    NlpStatus::DeadlineExceeded,
                    None,
                    started,
                ))
            }
            Some(recognizer) => {
                let fingerprint = recognizer.fingerprint().map(str::to_string);
                let adapter = RecognizerAdapter::new(recognizer, options.min_confidence);
                let rewrite = entity_stage(&adapter, &self.word_edges, &stage1.text)?;
                report.extend(rewrite.entries);
                Ok(self.finish(
                    rewrite.text,
                    report,
                    NlpStatus::Completed,
                    fingerprint.as_deref(),
                    started,
                ))
            }
        }
    }

    /// Reject invalid options and over-long input before any matcher runs
    fn check_input(&self, text: &str, options: &RedactOptions) -> Result<()> {
        options.validate()?;
        // Byte length bounds char length from above
        if text.len() > self.max_input_chars {
            let chars = text.chars().count();
            if chars > self.max_input_chars {
                return Err(RedactorError::InvalidInput(format!(
                    "input is {chars} chars, limit is {}",
                    self.max_input_chars
                )));
            }
        }
        Ok(())
    }

    /// The recognizer, if this call needs one
    fn recognizer_for(&self, options: &RedactOptions) -> Result<Option<Arc<dyn EntityRecognizer>>> {
        if options.enable_nlp {
            self.model.get().map(Some)
        } else {
            Ok(None)
        }
    }

    fn finish(
        &self,
        sanitized_text: String,
        report: RedactionReport,
        nlp_status: NlpStatus,
        model_fingerprint: Option<&str>,
        started: Instant,
    ) -> RedactionOutcome {
        let elapsed = started.elapsed();
        log_redaction_complete!(report.len(), report.total_chars_removed(), nlp_status, elapsed);

        if let Some(logger) = &self.audit_logger {
            logger.record(&AuditRecord::new(&report, nlp_status, elapsed, model_fingerprint));
        }

        RedactionOutcome {
            sanitized_text,
            report,
            nlp_status,
        }
    }
}

impl std::fmt::Debug for RedactionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let matchers: Vec<_> = self.matchers.iter().map(|m| m.name()).collect();
        f.debug_struct("RedactionEngine")
            .field("matchers", &matchers)
            .field("model", &self.model)
            .field("max_input_chars", &self.max_input_chars)
            .field("audit_logger", &self.audit_logger)
            .finish()
    }
}

/// Stage 1: every matcher on the original text
fn pattern_stage(
    matchers: &[Box<dyn PatternMatcher>],
    text: &str,
    enable_regex: bool,
) -> Result<(Rewrite, RedactionReport)> {
    let mut report = RedactionReport::new();
    if !enable_regex {
        let unchanged = Rewrite {
            text: text.to_string(),
            entries: Vec::new(),
        };
        return Ok((unchanged, report));
    }

    let mut spans = Vec::new();
    for matcher in matchers {
        let found = matcher.detect(text)?;
        tracing::trace!(matcher = matcher.name(), count = found.len(), "Matcher finished");
        spans.extend(found);
    }

    let mut rewrite = apply_replacements(text, &resolve(spans), RedactionStage::Patterns)?;
    report.extend(std::mem::take(&mut rewrite.entries));
    Ok((rewrite, report))
}

/// Stage 2: recognizer on the stage-1 output, leaving placeholders alone
///
/// Spans are widened to whole words first. A placeholder glued to the rest of
/// a word (`[Redacted PII]5551234567`) would otherwise expose text the
/// pattern matchers rejected on the first pass.
fn entity_stage(adapter: &RecognizerAdapter, edges: &WordEdges, text: &str) -> Result<Rewrite> {
    let map = OffsetMap::new(text);
    let protected = Placeholders::protected_regions(text);

    let mut spans = Vec::new();
    for span in adapter.recognize(text)? {
        let widened = edges.widen(&map, span).ok_or_else(|| {
            RedactorError::RecognizerFault(format!(
                "span {}..{} is outside the text",
                span.start, span.end
            ))
        })?;
        let touches_placeholder = protected
            .iter()
            .any(|&(start, end)| widened.start < end && start < widened.end);
        if !touches_placeholder {
            spans.push(widened);
        }
    }

    apply_replacements(text, &resolve(spans), RedactionStage::Entities)
}

/// Resolve once the watch value turns `true`; never resolves if the sender is gone
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::models::{DetectionSource, EntityKind, Span};
    use serde_json::json;

    /// Tags every occurrence of the given words as PERSON
    struct WordRecognizer(Vec<&'static str>);

    impl EntityRecognizer for WordRecognizer {
        fn name(&self) -> &str {
            "words"
        }

        fn recognize(&self, text: &str) -> Result<Vec<Span>> {
            let map = crate::redaction::text::OffsetMap::new(text);
            let mut spans = Vec::new();
            for word in &self.0 {
                for (byte, found) in text.match_indices(word) {
                    if let Some((start, end)) = map.char_range(byte, byte + found.len()) {
                        spans.push(Span::new(start, end, EntityKind::Person, DetectionSource::Nlp));
                    }
                }
            }
            Ok(spans)
        }
    }

    fn engine_with(words: Vec<&'static str>) -> RedactionEngine {
        let model = ModelHandle::ready(Arc::new(WordRecognizer(words)));
        RedactionEngine::new(Arc::new(model)).unwrap()
    }

    #[test]
    fn test_regex_only() {
        let engine = engine_with(vec![]);
        let outcome = engine
            .redact("Contact me at a@b.c", &RedactOptions::regex_only())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "Contact me at [REDACTED EMAIL]");
        assert_eq!(outcome.nlp_status, NlpStatus::Disabled);
        assert_eq!(outcome.report.len(), 1);
    }

    #[test]
    fn test_both_stages_report_order() {
        let engine = engine_with(vec!["Ann"]);
        let outcome = engine
            .redact(
                "Ann: a@b.c, 5551234567",
                &RedactOptions::default(),
            )
            .unwrap();
        assert_eq!(
            outcome.sanitized_text,
            "[Redacted PII]: [REDACTED EMAIL], [REDACTED PHONE]"
        );
        let order: Vec<_> = outcome
            .report
            .entries()
            .iter()
            .map(|e| (e.stage, e.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                (RedactionStage::Patterns, EntityKind::Phone),
                (RedactionStage::Patterns, EntityKind::Email),
                (RedactionStage::Entities, EntityKind::Person),
            ]
        );
        assert_eq!(outcome.nlp_status, NlpStatus::Completed);
    }

    #[test]
    fn test_recognizer_cannot_touch_placeholders() {
        let engine = engine_with(vec!["EMAIL", "PHONE", "Redacted"]);
        let outcome = engine
            .redact("mail a@b.c or [Redacted PII]", &RedactOptions::default())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "mail [REDACTED EMAIL] or [Redacted PII]");
        assert_eq!(outcome.report.len(), 1);
    }

    #[test]
    fn test_entity_spans_cover_glued_words() {
        let engine = engine_with(vec!["John"]);
        let options = RedactOptions::default();

        let once = engine.redact("John5551234567 called", &options).unwrap();
        assert_eq!(once.sanitized_text, "[Redacted PII] called");
        assert_eq!(once.report.entries()[0].char_count_removed, 14);

        let twice = engine.redact(&once.sanitized_text, &options).unwrap();
        assert_eq!(twice.sanitized_text, once.sanitized_text);
        assert!(twice.report.is_empty());
    }

    #[test]
    fn test_nlp_disabled_never_touches_model() {
        let model = ModelHandle::lazy(|| Err(RedactorError::Io("no model".to_string())));
        let engine = RedactionEngine::new(Arc::new(model)).unwrap();
        let outcome = engine
            .redact("Call (123) 456-7890", &RedactOptions::regex_only())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "Call [REDACTED PHONE]");
        assert!(!engine.model().is_initialized());
    }

    #[test]
    fn test_model_unavailable() {
        let engine = RedactionEngine::new(Arc::new(ModelHandle::unavailable("missing"))).unwrap();
        let err = engine
            .redact("a@b.c", &RedactOptions::default())
            .unwrap_err();
        assert!(matches!(err, RedactorError::ModelUnavailable(_)));
    }

    #[test]
    fn test_input_length_bound() {
        let engine = engine_with(vec![]).with_max_input_chars(10);
        let err = engine
            .redact("01234567890", &RedactOptions::regex_only())
            .unwrap_err();
        assert!(matches!(err, RedactorError::InvalidInput(_)));

        // Ten multibyte chars are within the bound
        let outcome = engine
            .redact("éééééééééé", &RedactOptions::regex_only())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "éééééééééé");
    }

    #[test]
    fn test_passed_deadline_skips_stage_two() {
        let engine = engine_with(vec!["Ann"]);
        let options = RedactOptions::default().with_budget(Duration::ZERO);
        let outcome = engine.redact("Ann at a@b.c", &options).unwrap();
        assert_eq!(outcome.sanitized_text, "Ann at [REDACTED EMAIL]");
        assert_eq!(outcome.nlp_status, NlpStatus::DeadlineExceeded);
    }

    #[test]
    fn test_redact_bytes_rejects_invalid_utf8() {
        let engine = engine_with(vec![]);
        let err = engine
            .redact_bytes(&[0x66, 0x6f, 0xff, 0x6f], &RedactOptions::regex_only())
            .unwrap_err();
        assert!(matches!(err, RedactorError::InvalidInput(_)));
    }

    #[test]
    fn test_redact_json() {
        let engine = engine_with(vec![]);
        let outcome = engine
            .redact_json(&json!("reach me at a@b.c"), &RedactOptions::regex_only())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "reach me at [REDACTED EMAIL]");

        for value in [json!(42), json!(null), json!(["a@b.c"]), json!({"t": "x"})] {
            let err = engine
                .redact_json(&value, &RedactOptions::regex_only())
                .unwrap_err();
            assert!(matches!(err, RedactorError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_invalid_options() {
        let engine = engine_with(vec![]);
        let options = RedactOptions::default().with_min_confidence(3.0);
        assert!(matches!(
            engine.redact("text", &options),
            Err(RedactorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_default_config() {
        let engine = RedactionEngine::from_config(&RedactorConfig::default()).unwrap();
        assert!(engine.model().is_initialized());
        let outcome = engine
            .redact("John lives in Boston", &engine.default_options())
            .unwrap();
        assert_eq!(outcome.sanitized_text, "[Redacted PII] lives in [Redacted PII]");
    }

    #[tokio::test]
    async fn test_deadline_path_completes() {
        let engine = engine_with(vec!["Ann"]);
        let (_tx, rx) = watch::channel(false);
        let outcome = engine
            .redact_with_deadline(
                "Ann at a@b.c",
                &RedactOptions::default(),
                Duration::from_secs(5),
                rx,
            )
            .await
            .unwrap();
        assert_eq!(outcome.sanitized_text, "[Redacted PII] at [REDACTED EMAIL]");
        assert_eq!(outcome.nlp_status, NlpStatus::Completed);
    }

    #[tokio::test]
    async fn test_deadline_path_matches_sync_path() {
        let engine = engine_with(vec!["Ann"]);
        let (_tx, rx) = watch::channel(false);
        let text = "Ann5551234567, call (123) 456-7890 or mail a@b.c";
        let sync = engine.redact(text, &RedactOptions::default()).unwrap();
        let outcome = engine
            .redact_with_deadline(text, &RedactOptions::default(), Duration::MAX, rx)
            .await
            .unwrap();
        assert_eq!(outcome, sync);
        assert_eq!(
            outcome.sanitized_text,
            "[Redacted PII], call [REDACTED PHONE] or mail [REDACTED EMAIL]"
        );
    }

    #[tokio::test]
    async fn test_deadline_path_already_cancelled() {
        let engine = engine_with(vec!["Ann"]);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let outcome = engine
            .redact_with_deadline(
                "Ann at a@b.c",
                &RedactOptions::default(),
                Duration::from_secs(5),
                rx,
            )
            .await
            .unwrap();
        assert_eq!(outcome.sanitized_text, "Ann at [REDACTED EMAIL]");
        assert_eq!(outcome.nlp_status, NlpStatus::Cancelled);
    }
}
