//! Error types for the core pipeline.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while generating a post.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The model call failed.
    #[error("generation failed: {0}")]
    Generation(#[from] postcraft_llm::LlmError),

    /// The model call exceeded the processing timeout.
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
