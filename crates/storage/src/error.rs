use core_types::CoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read or write the journal file: {0}")]
    Io(#[from] std::io::Error),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An error occurred while reading or writing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid trade: {0}")]
    InvalidTrade(#[from] CoreError),

    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("No trade with id {0} exists in the journal.")]
    NotFound(Uuid),
}
