//! Error types shared across the autoquizzer crates.
//!
//! `ProviderError` lives here rather than in `autoquizzer-providers` so callers
//! can downcast endpoint failures without string matching.

use thiserror::Error;

/// Classified failure of an LLM or search endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// 401 or 403; carries the response body.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success status. `status` is 0 for an undecodable body.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    NetworkError(String),
}

/// A source page could not be fetched or turned into text.
///
/// Non-fatal per source: the synthesizer skips the source and carries on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no extractable text: {0}")]
    NoContent(String),
}

/// Quiz generation failed after parse repair.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// None of the sources produced prompt-ready text.
    #[error("no text could be extracted from {0}")]
    NoContent(String),

    /// The model endpoint failed.
    #[error("model call failed: {0:#}")]
    Model(anyhow::Error),

    /// The reply could not be coerced into a quiz, even after repair.
    #[error("failed to parse quiz from model reply: {0}")]
    Parse(String),

    /// The reply parsed but violates the quiz shape.
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),
}
