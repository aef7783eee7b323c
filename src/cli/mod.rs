//! Command-line front end.

mod commands;
pub mod progress;

pub use commands::{is_verbose, run};
