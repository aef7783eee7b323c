//! JSONL persistence for validated records.
//!
//! One JSON object per line, UTF-8, non-ASCII written as-is. The output file is
//! only ever appended to so repeated runs accumulate.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::extraction::ValidatedRecord;

/// Errors reading or writing the output log.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Serialize records as JSONL, each line newline-terminated.
pub fn to_jsonl(records: &[ValidatedRecord]) -> Result<String, OutputError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Append records to `path`, creating it if needed. Returns the number written.
pub fn append_jsonl(path: &Path, records: &[ValidatedRecord]) -> Result<usize, OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    tracing::debug!("Appended {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// Read a JSONL file back, re-validating each line. Blank lines are skipped.
pub fn read_jsonl(path: &Path) -> Result<Vec<ValidatedRecord>, OutputError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|e| OutputError::InvalidRecord {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        let record = ValidatedRecord::try_from(value).map_err(|w| OutputError::InvalidRecord {
            line: idx + 1,
            reason: w.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}
