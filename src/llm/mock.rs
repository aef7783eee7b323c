//! Scripted in-memory document service for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::service::{DocumentService, FileState, LlmError, RemoteFile, SourceDocument};

/// Records every call and replays scripted responses.
#[derive(Default)]
pub struct MockService {
    fail_upload: bool,
    initial_state: Option<FileState>,
    poll_states: Mutex<VecDeque<FileState>>,
    response: Option<String>,
    responses_by_name: HashMap<String, String>,
    fail_delete: bool,
    calls: Mutex<Calls>,
}

/// Call log.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub uploads: Vec<String>,
    pub polls: usize,
    pub generates: usize,
    pub deletes: Vec<String>,
}

impl MockService {
    /// A service whose upload is immediately ACTIVE and whose generation
    /// returns `response`.
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Default::default()
        }
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Default::default()
        }
    }

    /// Upload reports PROCESSING, then each poll returns the next state.
    pub fn with_poll_states(mut self, states: Vec<FileState>) -> Self {
        self.initial_state = Some(FileState::Processing);
        self.poll_states = Mutex::new(states.into());
        self
    }

    pub fn with_response_for(mut self, name: &str, response: impl Into<String>) -> Self {
        self.responses_by_name.insert(name.to_string(), response.into());
        self
    }

    pub fn with_failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    fn remote_file(name: &str, state: FileState) -> RemoteFile {
        RemoteFile {
            name: name.to_string(),
            uri: format!("https://files.test/{}", name),
            mime_type: "application/pdf".to_string(),
            state,
        }
    }
}

#[async_trait]
impl DocumentService for MockService {
    async fn upload(&self, document: &SourceDocument) -> Result<RemoteFile, LlmError> {
        self.calls.lock().unwrap().uploads.push(document.name.clone());
        if self.fail_upload {
            return Err(LlmError::Connection("upload refused".to_string()));
        }
        let state = self.initial_state.clone().unwrap_or(FileState::Active);
        Ok(Self::remote_file(&format!("files/{}", document.name), state))
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, LlmError> {
        self.calls.lock().unwrap().polls += 1;
        let state = self
            .poll_states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FileState::Active);
        Ok(Self::remote_file(name, state))
    }

    async fn generate(&self, file: &RemoteFile, _prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().generates += 1;
        let doc_name = file.name.trim_start_matches("files/");
        self.responses_by_name
            .get(doc_name)
            .or(self.response.as_ref())
            .cloned()
            .ok_or_else(|| LlmError::Api("no scripted response".to_string()))
    }

    async fn delete_file(&self, name: &str) -> Result<(), LlmError> {
        self.calls.lock().unwrap().deletes.push(name.to_string());
        if self.fail_delete {
            return Err(LlmError::Api("HTTP 500: delete failed".to_string()));
        }
        Ok(())
    }
}
