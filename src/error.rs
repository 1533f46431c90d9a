//! Error type shared by the store, ingestion and command layers.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building the history view.
///
/// Most variants are recovered from close to where they happen (a bad record
/// is skipped, a corrupt payload is discarded). Only store I/O failures and
/// bad user input travel all the way up to `main`.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read store entry {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored payload is not a JSON array of tasks: {0}")]
    Payload(String),

    #[error("malformed task record: {0}")]
    Record(String),

    #[error("invalid timestamp for {field}: {reason}")]
    Timestamp { field: &'static str, reason: String },

    #[error("unrecognised date '{0}' (try: today, yesterday, 3 days ago, last friday, 2026-10-14)")]
    DayInput(String),

    #[error("invalid month '{0}' (expected YYYY-MM)")]
    MonthInput(String),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
