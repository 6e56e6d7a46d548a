//! Named-entity recognition
//!
//! The engine never talks to a model directly. It goes through:
//! - [`EntityRecognizer`]: the capability "given text, return entity spans"
//! - [`ModelHandle`]: a load-once handle around an expensive-to-build recognizer
//! - [`RecognizerAdapter`]: applies the confidence threshold and checks spans
//!
//! The bundled model is [`gazetteer::GazetteerRecognizer`]; tests inject their
//! own implementations of the trait.

pub mod gazetteer;

use crate::domain::{RedactorError, Result};
use crate::redaction::models::{DetectionSource, Span};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub use gazetteer::GazetteerRecognizer;

/// Trait for named-entity recognizers
///
/// Implementations must be safe for concurrent read-only inference. A model
/// that is not must serialize access internally.
pub trait EntityRecognizer: Send + Sync {
    /// Model name used in logs
    fn name(&self) -> &str;

    /// Stable fingerprint of the loaded model, recorded in audit entries
    fn fingerprint(&self) -> Option<&str> {
        None
    }

    /// Recognize entities in `text`, returning spans with char offsets
    fn recognize(&self, text: &str) -> Result<Vec<Span>>;
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn EntityRecognizer>> + Send + Sync>;

/// Load-once handle to a recognizer
///
/// The loader runs at most once, either eagerly at construction or on first
/// use. A failed load is remembered and every later [`ModelHandle::get`]
/// returns [`RedactorError::ModelUnavailable`]; the model is never reloaded.
pub struct ModelHandle {
    cell: OnceLock<std::result::Result<Arc<dyn EntityRecognizer>, String>>,
    loader: Option<Loader>,
}

impl ModelHandle {
    /// Wrap an already-loaded recognizer
    pub fn ready(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(recognizer));
        Self { cell, loader: None }
    }

    /// Defer loading until first use
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EntityRecognizer>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            loader: Some(Box::new(loader)),
        }
    }

    /// Load immediately; a failure is kept and reported at first use
    pub fn eager<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EntityRecognizer>> + Send + Sync + 'static,
    {
        let handle = Self::lazy(loader);
        if let Err(e) = handle.get() {
            tracing::warn!(error = %e, "Entity recognizer failed to load at startup");
        }
        handle
    }

    /// A handle with no model at all
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Err(reason.into()));
        Self { cell, loader: None }
    }

    /// Get the recognizer, loading it on first call
    pub fn get(&self) -> Result<Arc<dyn EntityRecognizer>> {
        let state = self.cell.get_or_init(|| match &self.loader {
            Some(load) => match load() {
                Ok(recognizer) => {
                    tracing::info!(
                        model = recognizer.name(),
                        fingerprint = recognizer.fingerprint().unwrap_or("-"),
                        "Entity recognizer loaded"
                    );
                    Ok(recognizer)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Entity recognizer failed to load");
                    Err(e.to_string())
                }
            },
            None => Err("no recognizer configured".to_string()),
        });
        state
            .as_ref()
            .map(Arc::clone)
            .map_err(|reason| RedactorError::ModelUnavailable(reason.clone()))
    }

    /// Check whether a load has been attempted
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "loaded",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("ModelHandle").field("state", &state).finish()
    }
}

/// Threshold and sanity layer between a recognizer and the resolver
pub struct RecognizerAdapter {
    recognizer: Arc<dyn EntityRecognizer>,
    min_confidence: f32,
}

impl RecognizerAdapter {
    /// Create an adapter that drops spans below `min_confidence`
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, min_confidence: f32) -> Self {
        Self {
            recognizer,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    /// Run the recognizer and keep valid spans at or above the threshold
    ///
    /// A span outside the text, or one claiming a non-NLP source, is a
    /// recognizer fault and fails the call.
    pub fn recognize(&self, text: &str) -> Result<Vec<Span>> {
        let text_len = text.chars().count();
        let spans = self.recognizer.recognize(text)?;

        let mut kept = Vec::with_capacity(spans.len());
        for span in spans {
            if !span.is_within(text_len) {
                tracing::error!(
                    model = self.recognizer.name(),
                    start = span.start,
                    end = span.end,
                    text_len,
                    "Recognizer returned span outside the text"
                );
                return Err(RedactorError::RecognizerFault(format!(
                    "span {}..{} is outside text of {} chars",
                    span.start, span.end, text_len
                )));
            }
            if span.source != DetectionSource::Nlp {
                return Err(RedactorError::RecognizerFault(format!(
                    "span {}..{} has source {}, expected nlp",
                    span.start, span.end, span.source
                )));
            }
            if span.confidence >= self.min_confidence {
                kept.push(span);
            }
        }
        kept.sort_by_key(|s| (s.start, s.end));
        Ok(kept)
    }
}
