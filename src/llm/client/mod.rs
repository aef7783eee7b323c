//! Gemini client for grounded document extraction.
//!
//! Uses the Gemini Files API so whole PDFs (including scanned pages and
//! screenshots) are read by the model rather than pre-extracted text:
//! - resumable upload to `/upload/v1beta/files`
//! - `GET /v1beta/files/{id}` to poll processing state
//! - `POST /v1beta/models/{model}:generateContent` referencing the file URI
//! - `DELETE /v1beta/files/{id}` once done

mod config;
mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::service::{DocumentService, LlmError, RemoteFile, SourceDocument, PDF_MIME_TYPE};

pub use config::LlmConfig;
pub use prompts::EXTRACTION_PROMPT;

/// Gemini implementation of [`DocumentService`].
pub struct GeminiClient {
    config: LlmConfig,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct UploadStartRequest<'a> {
    file: UploadFileMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct UploadFileMetadata<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GenerateContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerateContent<'a> {
    role: &'static str,
    parts: Vec<GeneratePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeneratePart<'a> {
    FileData { file_data: FileData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GeminiClient {
    /// Create a new client. Fails if no API key is configured.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        // Endpoints read from a config file bypass `with_endpoint`.
        let endpoint = config.endpoint.clone();
        let config = config.with_endpoint(&endpoint);
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Api("GEMINI_API_KEY not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.config.endpoint, path)
    }

    async fn start_upload(&self, document: &SourceDocument, len: usize) -> Result<String, LlmError> {
        let url = format!("{}/upload/v1beta/files", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", len.to_string())
            .header("X-Goog-Upload-Header-Content-Type", PDF_MIME_TYPE)
            .json(&UploadStartRequest {
                file: UploadFileMetadata {
                    display_name: &document.name,
                },
            })
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        resp.headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| LlmError::Parse("Upload session URL missing from response".to_string()))
    }
}

#[async_trait]
impl DocumentService for GeminiClient {
    async fn upload(&self, document: &SourceDocument) -> Result<RemoteFile, LlmError> {
        let bytes = document.read().await?;
        debug!("Uploading {} ({} bytes)", document.name, bytes.len());

        let upload_url = self.start_upload(document, bytes.len()).await?;

        let resp = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let uploaded: UploadResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        debug!("Uploaded {} as {}", document.name, uploaded.file.name);
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, LlmError> {
        let resp = self
            .client
            .get(self.api_url(name))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        resp.json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }

    async fn generate(&self, file: &RemoteFile, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![GenerateContent {
                role: "user",
                parts: vec![
                    GeneratePart::FileData {
                        file_data: FileData {
                            mime_type: &file.mime_type,
                            file_uri: &file.uri,
                        },
                    },
                    GeneratePart::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json",
            },
        };

        let url = self.api_url(&format!("models/{}:generateContent", self.config.model));
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        response_text(body)
    }

    async fn delete_file(&self, name: &str) -> Result<(), LlmError> {
        let resp = self
            .client
            .delete(self.api_url(name))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Turn a non-success HTTP status into an API error carrying the body.
async fn check_status(resp: Response) -> Result<Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api(format!("HTTP {}: {}", status, body)))
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: GenerateResponse) -> Result<String, LlmError> {
    if let Some(error) = body.error {
        return Err(LlmError::Api(error.message));
    }
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Api(format!("Prompt blocked: {}", reason)));
    }

    let parts = body
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .ok_or_else(|| LlmError::Parse("Gemini returned no candidates".to_string()))?;

    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(LlmError::Parse("Gemini returned an empty response".to_string()));
    }
    Ok(text)
}
