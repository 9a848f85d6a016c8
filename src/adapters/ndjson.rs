use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parses newline-delimited JSON, one record per non-blank line.
pub fn parse<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let text = std::str::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("NDJSON input is not valid UTF-8: {}", e),
    })?;

    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| EtlError::NdjsonError {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    tracing::debug!("Parsed {} NDJSON records", records.len());
    Ok(records)
}

pub fn to_bytes<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.push(b'\n');
    }
    Ok(out)
}
