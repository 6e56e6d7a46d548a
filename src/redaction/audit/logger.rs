//! Audit logger for redaction calls

use crate::config::AuditConfig;
use crate::domain::{RedactorError, Result};
use crate::redaction::models::EntityKind;
use crate::redaction::report::{NlpStatus, RedactionReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use uuid::Uuid;

/// Audit log entry
///
/// Holds counts and metadata only; the redacted text and the removed
/// substrings never reach the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// RFC 3339 time the record was created
    pub timestamp: String,
    /// Unique id of the call
    pub request_id: Uuid,
    /// Replacement count per kind
    pub counts: BTreeMap<EntityKind, usize>,
    /// Total replacements
    pub replacements: usize,
    /// Total chars removed
    pub chars_removed: usize,
    /// Entity recognition status
    pub nlp_status: NlpStatus,
    /// Wall-clock processing time
    pub processing_ms: u64,
    /// Fingerprint of the recognizer model, when one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_fingerprint: Option<String>,
}

impl AuditRecord {
    /// Build a record for one completed call
    pub fn new(
        report: &RedactionReport,
        nlp_status: NlpStatus,
        elapsed: Duration,
        model_fingerprint: Option<&str>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: Uuid::new_v4(),
            counts: report.counts_by_kind(),
            replacements: report.len(),
            chars_removed: report.total_chars_removed(),
            nlp_status,
            processing_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            model_fingerprint: model_fingerprint.map(str::to_string),
        }
    }

    fn to_line(&self, json_format: bool) -> Result<String> {
        if json_format {
            return Ok(serde_json::to_string(self)?);
        }
        let counts = self
            .counts
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!(
            "[{}] Request: {} | Replacements: {} ({}) | Chars: {} | NLP: {} | Time: {}ms",
            self.timestamp,
            self.request_id,
            self.replacements,
            counts,
            self.chars_removed,
            self.nlp_status,
            self.processing_ms
        ))
    }
}

/// Fire-and-forget audit writer
///
/// Records are handed to a background worker through a bounded queue and
/// written to one append-only file. A full queue drops the record rather than
/// block the caller. Dropping the logger flushes pending records.
pub struct AuditLogger {
    writer: NonBlocking,
    _guard: WorkerGuard,
    json_format: bool,
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new audit logger appending to `log_path`
    pub fn new(log_path: impl AsRef<Path>, json_format: bool) -> Result<Self> {
        let log_path = log_path.as_ref().to_path_buf();
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                RedactorError::Configuration(format!(
                    "Audit log path has no file name: {}",
                    log_path.display()
                ))
            })?
            .to_string();
        let directory = match log_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        std::fs::create_dir_all(&directory).map_err(|e| {
            RedactorError::Io(format!(
                "Failed to create audit log directory {}: {e}",
                directory.display()
            ))
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(&directory)
            .map_err(|e| {
                RedactorError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    log_path.display()
                ))
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        Ok(Self {
            writer,
            _guard: guard,
            json_format,
            log_path,
        })
    }

    /// Create the logger described by the audit config, if enabled
    pub fn from_config(config: &AuditConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(&config.log_path, config.json_format).map(Some)
    }

    /// File the records go to
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Queue a record; failures are logged and never returned
    pub fn record(&self, record: &AuditRecord) {
        let line = match record.to_line(self.json_format) {
            Ok(line) => line + "\n",
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize audit record");
                return;
            }
        };

        let mut writer = self.writer.clone();
        // One write per record so a line is never split across queue messages
        if let Err(e) = writer.write_all(line.as_bytes()) {
            tracing::warn!(
                error = %e,
                request_id = %record.request_id,
                "Failed to queue audit record"
            );
        }
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("log_path", &self.log_path)
            .field("json_format", &self.json_format)
            .finish()
    }
}
