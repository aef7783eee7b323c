//! Batch driver: discover PDFs, process them in order, persist the results.

mod output;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::extraction::{DocumentProcessor, StatusSink, ValidatedRecord};
use crate::llm::SourceDocument;

pub use output::{append_jsonl, read_jsonl, to_jsonl, OutputError};

/// Default output log, shared by the command line and the upload page.
pub const DEFAULT_OUTPUT: &str = "casino_expert_train.jsonl";

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to list {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// What a batch run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of PDFs found.
    pub files: usize,
    /// Number of records appended to the output.
    pub records: usize,
    /// Whether the output file was written.
    pub written: bool,
}

/// Whether a path names a PDF (case-insensitive `.pdf` suffix).
pub fn is_pdf(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}

/// Collect the PDFs named by `input`.
///
/// A PDF file yields itself; a directory yields its PDF files sorted by name.
/// Anything else yields nothing.
pub fn discover_pdfs(input: &Path) -> Result<Vec<SourceDocument>, BatchError> {
    if input.is_file() {
        return Ok(if is_pdf(input) {
            vec![SourceDocument::from_path(input)]
        } else {
            Vec::new()
        });
    }

    if !input.is_dir() {
        return Ok(Vec::new());
    }

    let discovery_error = |source: std::io::Error| BatchError::Discovery {
        path: input.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(input).map_err(discovery_error)? {
        let path = entry.map_err(discovery_error)?.path();
        if path.is_file() && is_pdf(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths.into_iter().map(SourceDocument::from_path).collect())
}

/// Process documents strictly one at a time and collect every accepted record.
pub async fn process_documents(
    documents: &[SourceDocument],
    processor: &DocumentProcessor,
    sink: &dyn StatusSink,
) -> Vec<ValidatedRecord> {
    let total = documents.len();
    let mut all = Vec::new();

    for (idx, document) in documents.iter().enumerate() {
        sink.file_started(idx, total, &document.name);
        let records = processor.process(document, sink).await;
        all.extend(records);
        sink.file_finished(idx + 1, total);
    }

    all
}

/// Run a full batch from `input` into the `output` log.
///
/// The output file is left untouched when there is nothing to write.
pub async fn run(
    input: &Path,
    output: &Path,
    processor: &DocumentProcessor,
    sink: &dyn StatusSink,
) -> Result<BatchSummary, BatchError> {
    let documents = discover_pdfs(input)?;
    if documents.is_empty() {
        sink.warn(&format!("No PDF files found in {}", input.display()));
        return Ok(BatchSummary::default());
    }

    info!("Processing {} PDF files from {}", documents.len(), input.display());
    let records = process_documents(&documents, processor, sink).await;

    let mut summary = BatchSummary {
        files: documents.len(),
        ..Default::default()
    };

    if records.is_empty() {
        sink.warn("No data extracted.");
        return Ok(summary);
    }

    summary.records = append_jsonl(output, &records)?;
    summary.written = true;

    sink.success(&format!(
        "Task complete! Collected {} grounded Q&A entries.",
        summary.records
    ));
    sink.info(&format!("Saved to: {}", output.display()));

    Ok(summary)
}
