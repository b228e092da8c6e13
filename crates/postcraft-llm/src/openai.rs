//! OpenAI chat completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::LlmClient;
use crate::config::{ModelConfig, Provider};
use crate::error::{LlmError, Result};

/// Default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl OpenAiClient {
    /// Create a new client with the given API key and model configuration.
    pub fn new(api_key: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_BASE)
            .trim_end_matches('/')
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LlmError::Api {
            provider: "openai",
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        trace!(model = %self.config.model, prompt_len = prompt.len(), "Sending OpenAI request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url()))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response: ChatResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ResponseParse(e.to_string()))?;

        debug!(
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "OpenAI response received"
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse("openai"))
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.base_url()))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}
