//! The provider-neutral completion interface.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::claude::ClaudeClient;
use crate::config::{ModelConfig, Provider};
use crate::error::{LlmError, Result};
use crate::openai::OpenAiClient;

/// A model that turns a single text prompt into text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Which provider this client talks to.
    fn provider(&self) -> Provider;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Send `prompt` as a single user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Cheap connectivity and credential check (no tokens generated).
    async fn health_check(&self) -> Result<()>;
}

/// Build the client for the configured provider.
pub fn build_client(config: &ModelConfig, api_key: &str) -> Result<Arc<dyn LlmClient>> {
    if api_key.trim().is_empty() {
        return Err(LlmError::Configuration(format!(
            "API key for {} is empty",
            config.provider
        )));
    }

    info!(provider = %config.provider, model = %config.model, "Building LLM client");

    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::OpenAi => Arc::new(OpenAiClient::new(api_key, config.clone())),
        Provider::Claude => Arc::new(ClaudeClient::new(api_key, config.clone())),
    };
    Ok(client)
}
