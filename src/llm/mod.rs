//! Remote model access.
//!
//! [`DocumentService`] is the seam between the extraction pipeline and the
//! hosted model; [`GeminiClient`] is the production implementation.

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod service;

pub use client::{GeminiClient, LlmConfig, EXTRACTION_PROMPT};
pub use service::{
    DocumentService, FileState, LlmError, RemoteFile, SourceDocument, PDF_MIME_TYPE,
};
