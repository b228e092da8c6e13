//! Anthropic messages API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::LlmClient;
use crate::config::{ModelConfig, Provider};
use crate::error::{LlmError, Result};

/// Default Anthropic API base URL.
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for Claude models via the Anthropic messages API.
#[derive(Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl ClaudeClient {
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
            .unwrap_or(ANTHROPIC_API_BASE)
            .trim_end_matches('/')
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LlmError::Api {
            provider: "claude",
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LlmClient for ClaudeClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        trace!(model = %self.config.model, prompt_len = prompt.len(), "Sending Claude request");

        let response = self
            .request(self.client.post(format!("{}/v1/messages", self.base_url())))
            .json(&request)
            .send()
            .await?;

        let response: MessagesResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ResponseParse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Claude response received"
            );
        }

        // Claude may split a reply across several text blocks.
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse("claude"));
        }
        Ok(text)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .request(self.client.get(format!("{}/v1/models", self.base_url())))
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ClaudeClient {
        let config = ModelConfig::new(Provider::Claude, "claude-3-5-sonnet-latest")
            .with_base_url(server.uri());
        ClaudeClient::new("claude-key", config)
    }

    #[tokio::test]
    async fn test_complete_joins_text_blocks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "claude-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-sonnet-latest",
                "messages": [{"role": "user", "content": "write"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "TONE: What Broke\n"},
                    {"type": "text", "text": "POST: It crashed."}
                ],
                "usage": {"input_tokens": 10, "output_tokens": 8}
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).complete("write").await.unwrap();
        assert_eq!(text, "TONE: What Broke\nPOST: It crashed.");
    }

    #[tokio::test]
    async fn test_complete_maps_overloaded_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("write").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 529, provider: "claude", .. }));
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete("write").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse("claude")));
    }
}
