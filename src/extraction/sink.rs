//! Operator-facing status reporting.
//!
//! The processor reports progress through a [`StatusSink`] supplied by the
//! caller; the console and the web job each provide their own.

use std::sync::Mutex;

use serde::Serialize;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
    Success,
    Detail,
}

/// One status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

/// Receives progress and result messages while documents are processed.
pub trait StatusSink: Send + Sync {
    fn emit(&self, level: StatusLevel, text: &str);

    fn info(&self, text: &str) {
        self.emit(StatusLevel::Info, text);
    }

    fn warn(&self, text: &str) {
        self.emit(StatusLevel::Warn, text);
    }

    fn error(&self, text: &str) {
        self.emit(StatusLevel::Error, text);
    }

    fn success(&self, text: &str) {
        self.emit(StatusLevel::Success, text);
    }

    /// Indented supporting line, e.g. one rejection reason.
    fn detail(&self, text: &str) {
        self.emit(StatusLevel::Detail, text);
    }

    /// How many rejection reasons to show per document.
    fn rejection_sample_size(&self) -> usize {
        5
    }

    /// A batch is about to process document `index` (0-based) of `total`.
    fn file_started(&self, index: usize, total: usize, name: &str) {
        self.info(&format!("Processing {} ({}/{})", name, index + 1, total));
    }

    /// `done` of `total` documents have been processed.
    fn file_finished(&self, _done: usize, _total: usize) {}
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<StatusMessage>>,
    sample_size: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_size(sample_size: usize) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            sample_size: Some(sample_size),
        }
    }

    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Texts of all messages at `level`.
    pub fn texts(&self, level: StatusLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.level == level)
            .map(|m| m.text)
            .collect()
    }
}

impl StatusSink for MemorySink {
    fn emit(&self, level: StatusLevel, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(StatusMessage {
                level,
                text: text.to_string(),
            });
        }
    }

    fn rejection_sample_size(&self) -> usize {
        self.sample_size.unwrap_or(5)
    }
}
