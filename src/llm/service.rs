//! Remote document service abstraction.
//!
//! The extraction pipeline only needs four operations from the hosted model:
//! upload a document, check its processing state, run one generation request
//! against it, and delete it again. Everything else about the remote side is
//! opaque.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// MIME type sent with every uploaded document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Errors that can occur while talking to the remote service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the service.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Service returned an error status or error payload.
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading the local document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One input PDF, identified by a display name and the file holding its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Name shown to the operator and sent as the remote display name.
    pub name: String,
    /// File holding the document bytes.
    pub path: PathBuf,
}

impl SourceDocument {
    /// Create a document named after the final component of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    /// Create a document with an explicit display name (e.g. an uploaded filename).
    pub fn named(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Read the document bytes.
    pub async fn read(&self) -> Result<Vec<u8>, LlmError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    Other(String),
}

impl FileState {
    pub fn as_str(&self) -> &str {
        match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Other(s) => s,
        }
    }
}

impl From<String> for FileState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PROCESSING" => FileState::Processing,
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            _ => FileState::Other(s),
        }
    }
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a document held by the remote service.
///
/// Must be released with [`DocumentService::delete_file`] once processing ends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI used to reference the file from generation requests.
    #[serde(default)]
    pub uri: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default = "default_state")]
    pub state: FileState,
}

fn default_mime_type() -> String {
    PDF_MIME_TYPE.to_string()
}

fn default_state() -> FileState {
    FileState::Processing
}

/// Operations the extraction pipeline needs from the hosted model.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload a document and return its handle.
    async fn upload(&self, document: &SourceDocument) -> Result<RemoteFile, LlmError>;

    /// Re-fetch a file's current state.
    async fn get_file(&self, name: &str) -> Result<RemoteFile, LlmError>;

    /// Run one generation request over `file` and return the response text.
    async fn generate(&self, file: &RemoteFile, prompt: &str) -> Result<String, LlmError>;

    /// Delete an uploaded file.
    async fn delete_file(&self, name: &str) -> Result<(), LlmError>;
}
