//! Structural failure taxonomy for batch ingestion.
//!
//! Only *whole-call* failures live here: unreadable or malformed input
//! documents, batch-limit violations, and encoding problems. Per-row
//! problems (validation, duplicates, storage) never surface as errors;
//! they are captured in the [`crate::report::OutcomeReport`].

use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but carries no importable rows (no header row,
    /// empty batch array, header-only file).
    #[error("empty document: {0}")]
    EmptyDocument(String),

    /// The input is readable but does not match the expected shape
    /// (non-array JSON batch, nested values in a flat object, ...).
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("batch of {actual} row(s) exceeds the limit of {limit}")]
    BatchTooLarge { actual: usize, limit: usize },

    #[error("file size of {actual} byte(s) exceeds the {limit} byte ceiling")]
    FileTooLarge { actual: u64, limit: u64 },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("failed to decode text with encoding {0}")]
    Decode(String),
}
