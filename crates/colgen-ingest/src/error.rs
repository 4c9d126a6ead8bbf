//! Error types for dataset and rule-set loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing datasets and rule files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds maximum allowed size.
    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Unsupported file encoding (only UTF-8 is supported).
    #[error("unsupported encoding in {path}: {encoding} (only UTF-8 is supported)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// File extension does not map to a known format.
    #[error("unsupported file format: {path} (expected .csv, .json, .jsonl or .ndjson)")]
    UnsupportedFormat { path: PathBuf },

    // === Dataset Errors ===
    /// The input has no header row or no records at all.
    #[error("input is empty: {path}")]
    EmptyInput { path: PathBuf },

    /// A header cell is blank.
    #[error("empty column name at position {position} in {path}")]
    EmptyColumnName { path: PathBuf, position: usize },

    /// The same header appears twice.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { path: PathBuf, column: String },

    /// A CSV row has more fields than the header.
    #[error("malformed row at line {line} in {path}: expected at most {expected} fields, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// CSV parsing failed.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON document does not have the expected shape.
    #[error("unexpected JSON document in {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// A single JSON record is not an object (1-based record or line number).
    #[error("invalid record {index} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    // === Rule Errors ===
    /// The lookup table file is malformed.
    #[error("invalid lookup table {path}: {reason}")]
    InvalidLookup { path: PathBuf, reason: String },

    /// The rule-set file is malformed.
    #[error("invalid rule file {path}: {reason}")]
    InvalidRuleFile { path: PathBuf, reason: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/people.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /path/to/people.csv");

        let err = IngestError::MalformedRow {
            path: PathBuf::from("people.csv"),
            line: 3,
            expected: 2,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "malformed row at line 3 in people.csv: expected at most 2 fields, found 4"
        );
    }
}
