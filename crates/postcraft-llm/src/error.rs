//! Error types for the LLM crate.

use thiserror::Error;

/// Errors that can occur while talking to a model provider.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Missing or invalid configuration (API key, provider name).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The HTTP request could not be sent or timed out in transport.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider returned a non-success status.
    #[error("{provider} API error {status}: {body}")]
    Api {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The response body didn't have the expected shape.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// The provider answered with no text.
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Request(e.to_string())
    }
}

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;
