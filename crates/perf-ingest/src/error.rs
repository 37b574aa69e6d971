//! Error types for ingestion and dispatch.

use std::path::PathBuf;

use perf_model::SchemaError;
use thiserror::Error;

/// Errors that can occur while reading summary and detail files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Summary or detail file missing or unreadable.
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Header row could not be read.
    #[error("failed to read header row of {path}: {message}")]
    Header { path: PathBuf, message: String },

    /// Header row names the same column twice.
    #[error("duplicate header '{header}' in {path}")]
    DuplicateHeader { path: PathBuf, header: String },

    /// Detail file lacks headers that destination tables read.
    #[error("{path} is missing headers required by destination tables: {}", .missing.join(", "))]
    UnresolvedHeaders { path: PathBuf, missing: Vec<String> },

    /// A single record could not be parsed.
    #[error("malformed record in {path} at line {line}: {message}")]
    Record {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Summary record without a usable first column.
    #[error("summary record in {path} at line {line} has no entity identifier")]
    MissingIdentifier { path: PathBuf, line: u64 },

    // === Runtime Errors ===
    /// Worker pool for parallel entity processing could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors reported by a [`DataInserter`](crate::DataInserter).
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink refused the tuple.
    #[error("sink rejected insert into '{table}': {reason}")]
    Rejected { table: String, reason: String },

    /// Underlying storage failed.
    #[error("sink I/O error for table '{table}': {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode a row.
    #[error("failed to write row for table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    /// A writer lock was poisoned by a panicking thread.
    #[error("sink state poisoned")]
    Poisoned,
}

/// Failure of one (record, table) dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::UnresolvedHeaders {
            path: PathBuf::from("data/42-perform.csv"),
            missing: vec!["read_iops".to_string(), "status".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "data/42-perform.csv is missing headers required by destination tables: read_iops, status"
        );
    }

    #[test]
    fn dispatch_error_is_transparent() {
        let err: DispatchError = SinkError::Rejected {
            table: "io".to_string(),
            reason: "offline".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "sink rejected insert into 'io': offline");
    }
}
