//! Single-line JSON encoding of entries.

use crate::errors::{AppResult, CorruptionError};
use crate::journal_core::Entry;
use serde_json::Value;

/// Encodes an entry as one JSON line terminated by `\n`.
///
/// `serde_json` escapes control characters inside strings, so the output never
/// contains an embedded newline.
pub fn encode_line(entry: &Entry) -> AppResult<String> {
    let mut line = serde_json::to_string(&entry.to_record())?;
    line.push('\n');
    Ok(line)
}

/// Decodes one stored line into an entry.
///
/// Callers skip whitespace-only lines before calling this.
///
/// # Errors
///
/// - `AppError::Corruption` if the text is not JSON, not an object, or lacks
///   required keys.
/// - `AppError::Validation` if a field breaks an entry rule.
pub fn decode_line(line: &str) -> AppResult<Entry> {
    let value: Value = serde_json::from_str(line).map_err(|source| {
        CorruptionError::InvalidJson {
            path: None,
            line: None,
            content: line.to_string(),
            source,
        }
    })?;

    match value {
        Value::Object(record) => Entry::from_record(&record),
        _ => Err(CorruptionError::NotAnObject {
            path: None,
            line: None,
        }
        .into()),
    }
}
