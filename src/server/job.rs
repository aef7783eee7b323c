//! Background extraction job shared between the upload handlers.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::TempPath;
use tracing::{info, warn};

use crate::batch::append_jsonl;
use crate::extraction::{DocumentProcessor, StatusLevel, StatusMessage, StatusSink, ValidatedRecord};
use crate::llm::SourceDocument;

/// Number of accepted records shown as previews.
pub const PREVIEW_COUNT: usize = 3;

/// Lifecycle of the upload job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Complete,
}

/// Status of the current (or last) extraction job. Only one runs at a time.
#[derive(Debug, Clone, Default)]
pub struct ExtractionJob {
    pub id: Option<String>,
    pub state: JobState,
    pub files_done: usize,
    pub files_total: usize,
    pub current_file: Option<String>,
    pub messages: Vec<StatusMessage>,
    /// Accepted records of the job, in processing order.
    pub records: Vec<ValidatedRecord>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExtractionJob {
    /// Fresh running job over `total` files.
    pub fn start(id: String, total: usize) -> Self {
        Self {
            id: Some(id),
            state: JobState::Running,
            files_total: total,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }
}

pub type SharedJob = Arc<RwLock<ExtractionJob>>;

/// An uploaded PDF staged to a temporary file. The file is removed on drop.
pub struct StagedUpload {
    pub name: String,
    pub path: TempPath,
}

/// Status sink that records messages on the shared job.
pub struct JobSink {
    job: SharedJob,
}

impl JobSink {
    pub fn new(job: SharedJob) -> Self {
        Self { job }
    }

    fn update(&self, f: impl FnOnce(&mut ExtractionJob)) {
        if let Ok(mut job) = self.job.write() {
            f(&mut job);
        }
    }
}

impl StatusSink for JobSink {
    fn emit(&self, level: StatusLevel, text: &str) {
        self.update(|job| {
            job.messages.push(StatusMessage {
                level,
                text: text.to_string(),
            })
        });
    }

    fn rejection_sample_size(&self) -> usize {
        3
    }

    fn file_started(&self, index: usize, total: usize, name: &str) {
        self.update(|job| {
            job.current_file = Some(name.to_string());
            job.files_total = total;
        });
        self.info(&format!("Processing {} ({}/{})", name, index + 1, total));
    }

    fn file_finished(&self, done: usize, _total: usize) {
        self.update(|job| job.files_done = done);
    }
}

/// Process staged uploads one at a time, then publish the results.
pub async fn run_job(
    job: SharedJob,
    processor: Arc<DocumentProcessor>,
    uploads: Vec<StagedUpload>,
    output: std::path::PathBuf,
) {
    let sink = JobSink::new(job.clone());
    let total = uploads.len();
    let mut records = Vec::new();

    for (idx, upload) in uploads.into_iter().enumerate() {
        sink.file_started(idx, total, &upload.name);
        let document = SourceDocument::named(upload.name, upload.path.to_path_buf());
        records.extend(processor.process(&document, &sink).await);
        // Remove the staged copy before moving on.
        if let Err(e) = upload.path.close() {
            warn!("Failed to remove staged upload: {}", e);
        }
        sink.file_finished(idx + 1, total);
    }

    if records.is_empty() {
        sink.warn("No data extracted from the uploaded files.");
    } else {
        sink.success(&format!(
            "Extracted {} grounded Q&A entries in total.",
            records.len()
        ));
        match append_jsonl(&output, &records) {
            Ok(n) => {
                info!("Appended {} records to {}", n, output.display());
                sink.info(&format!("Also saved to local file: {}", output.display()));
            }
            Err(e) => warn!("Failed to append records to {}: {}", output.display(), e),
        }
    }

    sink.update(|job| {
        job.records = records;
        job.current_file = None;
        job.state = JobState::Complete;
        job.finished_at = Some(Utc::now());
    });
}
