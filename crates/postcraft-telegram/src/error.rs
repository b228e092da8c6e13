//! Error types for the Telegram bot.

use thiserror::Error;

use crate::flow::InvalidTransition;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] postcraft_core::ConfigError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    Startup(String),

    /// Model client could not be built or reached.
    #[error("LLM error: {0}")]
    Llm(#[from] postcraft_llm::LlmError),

    /// Post generation failed or timed out.
    #[error("Generation error: {0}")]
    Generation(#[from] postcraft_core::CoreError),

    /// Post storage failed.
    #[error("Storage error: {0}")]
    Persistence(#[from] postcraft_persistence::PersistenceError),

    /// Telegram API request failed.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Uploaded document could not be fetched or decoded.
    #[error("Download failed: {0}")]
    Download(String),

    /// The action is not possible in the current conversation state.
    #[error(transparent)]
    Flow(#[from] InvalidTransition),

    /// Something the action needs is missing from the session.
    #[error("{0}")]
    Unavailable(String),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
