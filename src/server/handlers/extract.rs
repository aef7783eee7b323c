//! Upload, job status and download endpoints.

use std::io::Write;
use std::path::Path;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::job::{self, ExtractionJob, JobState, StagedUpload, PREVIEW_COUNT};
use super::super::AppState;
use crate::batch::{is_pdf, to_jsonl, DEFAULT_OUTPUT};
use crate::extraction::{StatusMessage, ValidatedRecord};

/// Multipart field carrying the uploaded PDFs.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub job_id: String,
    pub files: Vec<String>,
}

/// Snapshot of the extraction job for the upload page.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Option<String>,
    pub state: JobState,
    pub files_done: usize,
    pub files_total: usize,
    pub current_file: Option<String>,
    pub messages: Vec<StatusMessage>,
    pub entries: usize,
    pub previews: Vec<ValidatedRecord>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&ExtractionJob> for JobStatusResponse {
    fn from(job: &ExtractionJob) -> Self {
        Self {
            job_id: job.id.clone(),
            state: job.state,
            files_done: job.files_done,
            files_total: job.files_total,
            current_file: job.current_file.clone(),
            messages: job.messages.clone(),
            entries: job.records.len(),
            previews: job.records.iter().take(PREVIEW_COUNT).cloned().collect(),
            started_at: job.started_at,
            finished_at: job.finished_at,
        }
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn busy() -> Response {
    error(
        StatusCode::CONFLICT,
        "An extraction is already running. Wait for it to finish.",
    )
}

/// Write one upload to a temporary `.pdf` file.
fn stage_upload(name: &str, bytes: &[u8]) -> std::io::Result<StagedUpload> {
    let mut file = tempfile::Builder::new()
        .prefix("groundqa-")
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(StagedUpload {
        name: name.to_string(),
        path: file.into_temp_path(),
    })
}

/// Start extracting the uploaded PDFs in the background.
pub async fn api_start_extraction(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    {
        let job = match state.job.read() {
            Ok(job) => job,
            Err(_) => return error(StatusCode::INTERNAL_SERVER_ERROR, "Job state unavailable"),
        };
        if job.is_running() {
            return busy();
        }
    }

    let mut uploads = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read multipart body: {}", e);
                return error(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e));
            }
        };
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        // Keep only the final path component of the client's filename.
        let name = field
            .file_name()
            .and_then(|n| Path::new(n).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_pdf(Path::new(&name)) {
            tracing::debug!("Skipping non-PDF upload {:?}", name);
            continue;
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read upload bytes: {}", e);
                return error(StatusCode::BAD_REQUEST, "Failed to read file data.");
            }
        };
        match stage_upload(&name, &bytes) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                tracing::warn!("Failed to stage {}: {}", name, e);
                return error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to stage {}: {}", name, e),
                );
            }
        }
    }

    if uploads.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Please upload at least one PDF file.");
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    let files: Vec<String> = uploads.iter().map(|u| u.name.clone()).collect();
    {
        let mut job = match state.job.write() {
            Ok(job) => job,
            Err(_) => return error(StatusCode::INTERNAL_SERVER_ERROR, "Job state unavailable"),
        };
        // Another upload may have started a job while this one was staging.
        if job.is_running() {
            return busy();
        }
        *job = ExtractionJob::start(job_id.clone(), uploads.len());
    }

    tracing::info!("Starting extraction job {} over {} files", job_id, files.len());
    tokio::spawn(job::run_job(
        state.job.clone(),
        state.processor.clone(),
        uploads,
        state.output.clone(),
    ));

    (StatusCode::ACCEPTED, Json(StartResponse { job_id, files })).into_response()
}

/// Current (or last) job status.
pub async fn api_extraction_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.job.read() {
        Ok(job) => Json(JobStatusResponse::from(&*job)).into_response(),
        Err(_) => error(StatusCode::INTERNAL_SERVER_ERROR, "Job state unavailable"),
    }
}

/// Every record of the last completed job, as a JSON array.
pub async fn api_extraction_records(State(state): State<AppState>) -> impl IntoResponse {
    match state.job.read() {
        Ok(job) if job.state == JobState::Complete => Json(job.records.clone()).into_response(),
        Ok(_) => Json(Vec::<ValidatedRecord>::new()).into_response(),
        Err(_) => error(StatusCode::INTERNAL_SERVER_ERROR, "Job state unavailable"),
    }
}

/// Records of the last completed job as a JSONL attachment.
pub async fn api_download_results(State(state): State<AppState>) -> impl IntoResponse {
    let records = match state.job.read() {
        Ok(job) if job.state == JobState::Complete => job.records.clone(),
        Ok(_) => Vec::new(),
        Err(_) => return error(StatusCode::INTERNAL_SERVER_ERROR, "Job state unavailable"),
    };
    if records.is_empty() {
        return error(StatusCode::NOT_FOUND, "No extracted data to download.");
    }

    match to_jsonl(&records) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/jsonl")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DEFAULT_OUTPUT),
            )
            .body(Body::from(body))
            .map(IntoResponse::into_response)
            .unwrap_or_else(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
