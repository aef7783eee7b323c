//! Grounded Q&A extraction: document lifecycle and citation validation.

mod processor;
mod record;
mod sink;
mod validator;

pub use processor::{
    parse_candidates, DocumentProcessor, ProcessError, ProcessorOptions, DEFAULT_POLL_INTERVAL,
};
pub use record::{ValidatedRecord, RECORD_KEYS};
pub use sink::{MemorySink, StatusLevel, StatusMessage, StatusSink};
pub use validator::{
    failed_fields, validate, validate_all, CitationField, RejectionWarning, ValidationOutcome,
    MIN_QUOTE_CHARS,
};
