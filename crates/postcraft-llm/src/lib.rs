//! LLM provider clients for Postcraft.
//!
//! Post generation needs exactly one capability from a model: turn a prompt
//! into text. This crate expresses that as the [`LlmClient`] trait with two
//! implementations selected at startup:
//!
//! - [`OpenAiClient`]: OpenAI chat completions API
//! - [`ClaudeClient`]: Anthropic messages API
//!
//! # Example
//!
//! ```no_run
//! use postcraft_llm::{build_client, ModelConfig, Provider};
//!
//! # async fn run() -> postcraft_llm::Result<()> {
//! let config = ModelConfig::new(Provider::OpenAi, "gpt-4o");
//! let client = build_client(&config, "sk-...")?;
//! let text = client.complete("Write a haiku about borrow checking").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod claude;
pub mod client;
pub mod config;
pub mod error;
pub mod openai;

pub use claude::ClaudeClient;
pub use client::{build_client, LlmClient};
pub use config::{ModelConfig, Provider};
pub use error::{LlmError, Result};
pub use openai::OpenAiClient;
