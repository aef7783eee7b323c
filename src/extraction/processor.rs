//! Per-document extraction lifecycle.
//!
//! upload → wait until ACTIVE → generate → parse → validate → report, with the
//! uploaded file deleted on every exit path once it exists. Failures never
//! escape: a failed document yields no records and an error line on the sink.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{DocumentService, FileState, LlmError, RemoteFile, SourceDocument, EXTRACTION_PROMPT};

use super::record::ValidatedRecord;
use super::sink::StatusSink;
use super::validator::{validate_all, ValidationOutcome};

/// Default delay between processing-state checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Reasons a document produced no records.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Upload failed: {0}")]
    Upload(#[source] LlmError),

    #[error("File processing failed with state: {0}")]
    NotActive(FileState),

    #[error("File still processing after {0} status checks")]
    PollLimit(u32),

    #[error(transparent)]
    Remote(#[from] LlmError),

    #[error("Invalid JSON in model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a JSON array of entries, got {0}")]
    NotArray(&'static str),
}

/// Tunables for the document lifecycle.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Delay between processing-state checks.
    pub poll_interval: Duration,
    /// Give up after this many checks. `None` waits indefinitely.
    pub max_poll_attempts: Option<u32>,
    /// Instruction sent with every document.
    pub prompt: String,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            prompt: EXTRACTION_PROMPT.to_string(),
        }
    }
}

/// Runs documents through the remote model one at a time.
pub struct DocumentProcessor {
    service: Arc<dyn DocumentService>,
    options: ProcessorOptions,
}

impl DocumentProcessor {
    pub fn new(service: Arc<dyn DocumentService>, options: ProcessorOptions) -> Self {
        Self { service, options }
    }

    /// Extract validated records from one document.
    pub async fn process(
        &self,
        document: &SourceDocument,
        sink: &dyn StatusSink,
    ) -> Vec<ValidatedRecord> {
        sink.info(&format!("Deep analysis in progress: {}", document.name));

        let mut uploaded: Option<String> = None;
        let result = self.run(document, sink, &mut uploaded).await;

        if let Some(name) = uploaded {
            self.release(&name).await;
        }

        match result {
            Ok(records) => records,
            Err(e) => {
                warn!("Extraction failed for {}: {}", document.name, e);
                sink.error(&format!("Failed to parse {}: {}", document.name, e));
                Vec::new()
            }
        }
    }

    async fn run(
        &self,
        document: &SourceDocument,
        sink: &dyn StatusSink,
        uploaded: &mut Option<String>,
    ) -> Result<Vec<ValidatedRecord>, ProcessError> {
        let file = self
            .service
            .upload(document)
            .await
            .map_err(ProcessError::Upload)?;
        *uploaded = Some(file.name.clone());

        let file = self.await_ready(file).await?;

        sink.info(&format!(
            "Analyzing content of {}... (This may take up to a minute)",
            document.name
        ));
        let text = self.service.generate(&file, &self.options.prompt).await?;
        debug!("Received {} bytes of model output for {}", text.len(), document.name);

        let candidates = parse_candidates(&text)?;
        let outcome = validate_all(candidates);
        report(&document.name, &outcome, sink);

        Ok(outcome.accepted)
    }

    /// Poll until the file leaves PROCESSING, then require ACTIVE.
    async fn await_ready(&self, mut file: RemoteFile) -> Result<RemoteFile, ProcessError> {
        let mut checks = 0u32;
        while file.state == FileState::Processing {
            if let Some(max) = self.options.max_poll_attempts {
                if checks >= max {
                    return Err(ProcessError::PollLimit(checks));
                }
            }
            tokio::time::sleep(self.options.poll_interval).await;
            checks += 1;
            file = self.service.get_file(&file.name).await?;
            debug!("{} state after {} checks: {}", file.name, checks, file.state);
        }

        if file.state != FileState::Active {
            return Err(ProcessError::NotActive(file.state));
        }
        Ok(file)
    }

    /// Delete the uploaded file; failures are logged and otherwise ignored.
    async fn release(&self, name: &str) {
        if let Err(e) = self.service.delete_file(name).await {
            warn!("Failed to delete remote file {}: {}", name, e);
        }
    }
}

/// Decode the model's response into candidate entries.
///
/// Tolerates a Markdown code fence around the JSON.
pub fn parse_candidates(text: &str) -> Result<Vec<Value>, ProcessError> {
    match serde_json::from_str::<Value>(strip_code_fence(text))? {
        Value::Array(entries) => Ok(entries),
        Value::Object(_) => Err(ProcessError::NotArray("an object")),
        Value::String(_) => Err(ProcessError::NotArray("a string")),
        Value::Number(_) => Err(ProcessError::NotArray("a number")),
        Value::Bool(_) => Err(ProcessError::NotArray("a boolean")),
        Value::Null => Err(ProcessError::NotArray("null")),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        // Drop the info string ("json") on the opening fence line.
        Some((_, body)) => body.trim(),
        // Single-line fence: skip the info string up to the JSON start.
        None => rest
            .find(|c| c == '[' || c == '{')
            .map(|i| &rest[i..])
            .unwrap_or("")
            .trim(),
    }
}

fn report(name: &str, outcome: &ValidationOutcome, sink: &dyn StatusSink) {
    let kept = outcome.accepted.len();
    if !outcome.rejected.is_empty() {
        sink.warn(&format!(
            "{} entries filtered out due to missing citations. Kept {}/{} entries.",
            outcome.rejected.len(),
            kept,
            outcome.total()
        ));
        for warning in outcome.rejected.iter().take(sink.rejection_sample_size()) {
            sink.detail(&warning.to_string());
        }
    }
    sink.success(&format!(
        "Successfully extracted {} grounded Q&A pairs from {}",
        kept, name
    ));
    info!(
        "Extraction complete for {}: kept {}/{} entries",
        name,
        kept,
        outcome.total()
    );
}
