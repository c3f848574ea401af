//! Game API error types.

use thiserror::Error;

/// Errors produced by game API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, body read, JSON decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered HTTP 401: the bearer token is no longer
    /// accepted. The caller refreshes and moves on; the original call is
    /// not retried in place.
    #[error("authorization expired (HTTP 401)")]
    AuthExpired,

    /// Any other unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log line.
        body: String,
    },

    /// The client could not be constructed (bad proxy, bad header value).
    #[error("client configuration error: {0}")]
    Config(String),
}

/// Result type for game API operations.
pub type ApiResult<T> = Result<T, ApiError>;
