//! Unified error types for the reader core.
//!
//! Cache and store failures are normally swallowed by the bundle layer; these
//! errors surface only at the edges (opening the store, validating input).

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::store::StoreError;

/// Unified error types for the reader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty cohort).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Date not in zero-padded `YYYY-MM-DD` form.
    #[error("INVALID_DATE: {0}")]
    InvalidDate(String),

    /// No bundle or content for the requested key.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Read tracking is not available for this view (preview or future date).
    #[error("READ_DISABLED: {0}")]
    ReadDisabled(String),

    /// Key-value store operation failed.
    #[error("STORE_ERROR: {0}")]
    Store(#[from] StoreError),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidDate(msg) => (-32602, format!("invalid date: {msg}")),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::ReadDisabled(msg) => (-32003, msg.clone()),
            Error::Store(e) => (-32002, e.to_string()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
