//! Common error types for cleanlog

use thiserror::Error;

/// Common result type for cleanlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store, upload handler and report job
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field was missing or a bound was exceeded.
    /// The message is shown to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    /// Upload could not be written to its destination directory
    #[error("Storage error: {0}")]
    Storage(String),

    /// Mail relay rejected or failed to deliver a message
    #[error("Mail error: {0}")]
    Mail(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("JSON encoding failed: {}", e))
    }
}
