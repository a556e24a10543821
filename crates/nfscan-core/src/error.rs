//! Error types for the nfscan-core library.

use thiserror::Error;

/// Main error type for the nfscan library.
#[derive(Error, Debug)]
pub enum NfscanError {
    /// Receipt persistence error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to persisting structured receipts.
///
/// These surface to the caller as failure indicators and never corrupt
/// the in-memory receipt state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// JSON serialization failed.
    #[error("failed to serialize receipt: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to create the output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write the output file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for the nfscan library.
pub type Result<T> = std::result::Result<T, NfscanError>;
