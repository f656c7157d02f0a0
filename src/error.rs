//! Error types for the feed pipeline.
//!
//! - [`ConfigError`]: the endpoint configuration cannot produce a request URL
//! - [`FetchError`]: a single HTTP round-trip failed
//! - [`ParseError`]: the response body does not have the expected top-level shape
//!
//! None of these reach the consumer directly. The loader converts them into a
//! [`LoadResult`](crate::models::LoadResult) before delivery.

use thiserror::Error;

/// Configuration errors raised while building a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base endpoint is not a well-formed absolute URL.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failure of a single GET request.
///
/// Kept `Clone` so it can be carried inside a delivered
/// [`LoadResult`](crate::models::LoadResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The connect or read timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The server answered with something other than `200 OK`.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// DNS failure, refused connection, interrupted stream and the like.
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Top-level structure problems in a response body.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not valid JSON at all.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but `response.results` is missing or not an array.
    #[error("missing or wrong-typed `response.results`")]
    MissingResults,
}
