//! groundqa - citation-grounded Q&A extraction from PDF manuals.
//!
//! The pipeline is:
//! - `batch`: discover PDFs, process them one at a time, append JSONL output
//! - `extraction`: per-document lifecycle against the remote model plus
//!   citation validation of every returned record
//! - `llm`: the remote document service abstraction and its Gemini client
//! - `cli` / `server`: command-line and browser front ends

pub mod batch;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod server;
