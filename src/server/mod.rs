//! Web server for uploading PDFs and following extraction progress.
//!
//! Provides a single upload page backed by a small JSON API:
//! - one background extraction job at a time
//! - polled job status with previews of accepted records
//! - JSONL download of the last completed job

mod handlers;
mod job;
mod routes;
mod templates;

pub use job::{ExtractionJob, JobState};
pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::extraction::DocumentProcessor;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
    /// JSONL log that completed jobs append to.
    pub output: PathBuf,
    /// Extraction job status (only one can run at a time).
    pub job: Arc<RwLock<ExtractionJob>>,
}

impl AppState {
    pub fn new(processor: DocumentProcessor, output: PathBuf) -> Self {
        Self {
            processor: Arc::new(processor),
            output,
            job: Arc::new(RwLock::new(ExtractionJob::default())),
        }
    }
}

/// Start the web server.
pub async fn serve(
    processor: DocumentProcessor,
    output: PathBuf,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let state = AppState::new(processor, output);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::extraction::ProcessorOptions;
    use crate::llm::mock::MockService;

    const BOUNDARY: &str = "groundqa-test-boundary";

    const RESPONSE: &str = r#"[
        {"instruction": "What resets the jackpot?", "input": "Jackpot screen", "output": "The reset value.", "page_number": 12, "source_quote": "The jackpot returns to its reset value after a win", "section": "Jackpots"},
        {"instruction": "Ungrounded", "input": "", "output": "x", "page_number": 1, "source_quote": "", "section": "Jackpots"}
    ]"#;

    fn setup_test_app(service: MockService) -> (axum::Router, AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let options = ProcessorOptions {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        let processor = DocumentProcessor::new(Arc::new(service), options);
        let state = AppState::new(processor, dir.path().join("train.jsonl"));
        (create_router(state.clone()), state, dir)
    }

    fn multipart_request(files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (field, filename) in files {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4 test\r\n",
                BOUNDARY, field, filename
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/api/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn wait_for_completion(app: &axum::Router) -> Value {
        for _ in 0..200 {
            let status = json_body(get(app, "/api/extract/status").await).await;
            if status["state"] == "complete" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("extraction job did not complete");
    }

    #[tokio::test]
    async fn test_upload_page() {
        let (app, _state, _dir) = setup_test_app(MockService::returning("[]"));

        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("upload-form"));
    }

    #[tokio::test]
    async fn test_idle_status_and_empty_download() {
        let (app, _state, _dir) = setup_test_app(MockService::returning("[]"));

        let status = json_body(get(&app, "/api/extract/status").await).await;
        assert_eq!(status["state"], "idle");
        assert_eq!(status["entries"], 0);

        let response = get(&app, "/api/extract/download").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let records = json_body(get(&app, "/api/extract/records").await).await;
        assert_eq!(records, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_records_lists_every_entry_beyond_previews() {
        let entries: Vec<String> = (1..=5)
            .map(|page| {
                format!(
                    r#"{{"instruction": "q{0}", "input": "", "output": "a", "page_number": {0}, "source_quote": "Blackout windows block offer redemption", "section": "Blackouts"}}"#,
                    page
                )
            })
            .collect();
        let (app, _state, _dir) =
            setup_test_app(MockService::returning(format!("[{}]", entries.join(","))));

        let response = app
            .clone()
            .oneshot(multipart_request(&[("files", "manual.pdf")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let status = wait_for_completion(&app).await;
        assert_eq!(status["entries"], 5);
        assert_eq!(status["previews"].as_array().unwrap().len(), 3);

        let records = json_body(get(&app, "/api/extract/records").await).await;
        let pages: Vec<i64> = records
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["page_number"].as_i64().unwrap())
            .collect();
        assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_upload_without_pdf_rejected() {
        let (app, state, _dir) = setup_test_app(MockService::returning("[]"));

        let response = app
            .clone()
            .oneshot(multipart_request(&[("files", "notes.txt")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Please upload at least one PDF file.");
        assert_eq!(state.job.read().unwrap().state, JobState::Idle);
    }

    #[tokio::test]
    async fn test_upload_extract_and_download() {
        let (app, state, dir) = setup_test_app(MockService::returning(RESPONSE));

        let response = app
            .clone()
            .oneshot(multipart_request(&[
                ("files", "manual.pdf"),
                ("other", "ignored.pdf"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let started = json_body(response).await;
        assert_eq!(started["files"], serde_json::json!(["manual.pdf"]));

        let status = wait_for_completion(&app).await;
        assert_eq!(status["job_id"], started["job_id"]);
        assert_eq!(status["files_done"], 1);
        assert_eq!(status["entries"], 1);
        assert_eq!(status["previews"][0]["page_number"], 12);
        assert_eq!(status["previews"][0]["section"], "Jackpots");

        let response = get(&app, "/api/extract/download").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/jsonl"
        );
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("casino_expert_train.jsonl"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().lines().count(), 1);

        let written = std::fs::read_to_string(dir.path().join("train.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert_eq!(state.job.read().unwrap().records.len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_while_running() {
        let (app, state, _dir) = setup_test_app(MockService::returning("[]"));
        *state.job.write().unwrap() = ExtractionJob::start("busy".to_string(), 2);

        let response = app
            .clone()
            .oneshot(multipart_request(&[("files", "manual.pdf")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(state.job.read().unwrap().id.as_deref(), Some("busy"));
    }
}
