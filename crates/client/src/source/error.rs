//! Content source error types.

use std::sync::Arc;

/// Errors from a content source lookup.
///
/// Every variant means "could not determine"; a source that knows there is no
/// content returns an empty lookup instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Non-success HTTP status other than 404.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// API answered with `ok: false`.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Legacy content file could not be read.
    #[error("legacy content file error: {0}")]
    Legacy(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ResolveError::Timeout } else { ResolveError::Network(Arc::new(err)) }
    }
}
