use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading an event-log dataset.
///
/// The cleaning and aggregation pipeline itself never fails; these variants
/// only surface from the input layer and input-format resolution.
#[derive(Error, Debug)]
pub enum EventLabError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV text could not be tokenised.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The CSV header row is absent or carries none of the known columns.
    #[error("Missing CSV header: {0}")]
    MissingHeader(String),

    /// The requested input format is not one the reader understands.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias used throughout the eventlab crates.
pub type Result<T> = std::result::Result<T, EventLabError>;
