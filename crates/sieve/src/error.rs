//! Error types for the Sieve library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sieve operations.
///
/// Only structural failures and caller misuse surface as errors. Malformed
/// cells are counted by the metrics and left untouched by corrections.
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing input data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Declared or inferred format is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Input is larger than the configured limit.
    #[error("Input of {size} bytes exceeds the {limit} byte limit")]
    SizeExceeded { size: u64, limit: u64 },

    /// Dataset columns disagree on length or names are duplicated.
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    /// A plan or selection referenced a column the dataset does not have.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// A selection referenced a suggestion id that was never generated.
    #[error("Unknown suggestion '{id}' for column '{column}'")]
    UnknownSuggestion { column: String, id: String },

    /// An orchestrator operation was called from the wrong state.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// A correction run was cancelled between stages.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scheduled job lookup failed.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The chat assistant could not produce an answer.
    #[error("Assistant error: {0}")]
    Assistant(String),
}

/// Result type alias for Sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
