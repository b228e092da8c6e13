//! Prompt → model → parsed post.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use postcraft_llm::{LlmClient, Provider};
use postcraft_models::{AudienceType, GeneratedPost};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::parser::parse_response;
use crate::prompt::{build_revision_prompt, PromptRequest};

/// Model calls in flight at once during batch generation.
pub const BATCH_CONCURRENCY: usize = 3;

/// Generates posts through an [`LlmClient`], bounding every call by a timeout.
#[derive(Clone)]
pub struct PostGenerator {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl PostGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn provider(&self) -> Provider {
        self.llm.provider()
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Underlying client, for health checks.
    pub fn client(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    async fn complete(&self, prompt: &str) -> Result<GeneratedPost> {
        debug!(prompt_len = prompt.len(), model = self.llm.model(), "Sending prompt");

        let raw = tokio::time::timeout(self.timeout, self.llm.complete(prompt))
            .await
            .map_err(|_| CoreError::Timeout(self.timeout.as_secs()))??;

        let post = parse_response(&raw);
        if post.fallback {
            warn!(response_len = raw.len(), "Model response had no POST section");
        }
        info!(tone = %post.tone, words = post.word_count(), "Generated post");
        Ok(post)
    }

    /// Generate one post.
    pub async fn generate(&self, request: &PromptRequest) -> Result<GeneratedPost> {
        self.complete(&request.build()).await
    }

    /// Rewrite `draft` following the user's instructions.
    pub async fn revise(
        &self,
        draft: &GeneratedPost,
        instructions: &str,
        audience: AudienceType,
    ) -> Result<GeneratedPost> {
        self.complete(&build_revision_prompt(draft, instructions, audience))
            .await
    }

    /// Generate one post per request, [`BATCH_CONCURRENCY`] at a time.
    ///
    /// Results come back in request order; one failure does not affect the others.
    pub async fn generate_batch(&self, requests: &[PromptRequest]) -> Vec<Result<GeneratedPost>> {
        info!(count = requests.len(), "Generating batch");
        let prompts: Vec<String> = requests.iter().map(PromptRequest::build).collect();
        stream::iter(prompts)
            .map(|prompt| {
                let generator = self.clone();
                async move { generator.complete(&prompt).await }
            })
            .buffered(BATCH_CONCURRENCY)
            .collect()
            .await
    }
}

impl std::fmt::Debug for PostGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostGenerator")
            .field("provider", &self.llm.provider())
            .field("model", &self.llm.model())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postcraft_llm::LlmError;
    use postcraft_models::Tone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with a fixed response after an optional delay, recording prompts.
    struct MockLlm {
        response: String,
        delay: Duration,
        fail_on: Option<String>,
        prompts: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockLlm {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                delay: Duration::ZERO,
                fail_on: None,
                prompts: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn failing_on(mut self, needle: &str) -> Self {
            self.fail_on = Some(needle.to_string());
            self
        }
    }

    #[async_trait]
    impl LlmClient for MockLlm {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        fn model(&self) -> &str {
            "mock"
        }

        async fn complete(&self, prompt: &str) -> postcraft_llm::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(needle) = &self.fail_on {
                if prompt.contains(needle.as_str()) {
                    return Err(LlmError::Api {
                        provider: "openai",
                        status: 500,
                        body: "boom".into(),
                    });
                }
            }
            Ok(self.response.clone())
        }

        async fn health_check(&self) -> postcraft_llm::Result<()> {
            Ok(())
        }
    }

    const RESPONSE: &str = "TONE: Problem→Solution→Result\nPOST: I built a bot that drafts my posts. It saves me an hour a week.\nREASON: Clear before and after.";

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let mock = Arc::new(MockLlm::new(RESPONSE));
        let generator = PostGenerator::new(mock.clone(), Duration::from_secs(5));

        let source = "I built a bot. It saves me time.";
        let request = PromptRequest::new(source, AudienceType::Business);
        let post = generator.generate(&request).await.unwrap();

        assert_eq!(post.tone, Tone::ProblemSolutionResult);
        assert!(post.post_content.starts_with("I built a bot"));
        assert_eq!(post.reason, "Clear before and after.");

        let prompts = mock.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(crate::prompt::BUSINESS_AUDIENCE_INSTRUCTIONS));
        assert!(prompts[0].contains(source));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock = Arc::new(MockLlm::new(RESPONSE).with_delay(Duration::from_secs(5)));
        let generator = PostGenerator::new(mock, Duration::from_millis(50));

        let err = generator
            .generate(&PromptRequest::new("x", AudienceType::Business))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let mock = Arc::new(MockLlm::new(RESPONSE).failing_on("SOURCE"));
        let generator = PostGenerator::new(mock, Duration::from_secs(5));

        let err = generator
            .generate(&PromptRequest::new("x", AudienceType::Business))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Generation(_)));
    }

    #[tokio::test]
    async fn test_revise_sends_draft_and_instructions() {
        let mock = Arc::new(MockLlm::new(RESPONSE));
        let generator = PostGenerator::new(mock.clone(), Duration::from_secs(5));
        let draft = GeneratedPost {
            tone: Tone::WhatBroke,
            post_content: "Old draft text.".into(),
            reason: String::new(),
            fallback: false,
        };

        generator
            .revise(&draft, "Shorter please", AudienceType::Technical)
            .await
            .unwrap();

        let prompts = mock.prompts.lock().unwrap();
        assert!(prompts[0].contains("Old draft text."));
        assert!(prompts[0].contains("Shorter please"));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let mock = Arc::new(
            MockLlm::new(RESPONSE)
                .with_delay(Duration::from_millis(20))
                .failing_on("file-two"),
        );
        let generator = PostGenerator::new(mock.clone(), Duration::from_secs(5));

        let requests: Vec<PromptRequest> = ["file-one", "file-two", "file-three", "file-four", "file-five"]
            .iter()
            .map(|s| PromptRequest::new(*s, AudienceType::Technical))
            .collect();
        let results = generator.generate_batch(&requests).await;

        assert_eq!(results.len(), 5);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2..].iter().all(|r| r.is_ok()));
        assert!(mock.max_in_flight.load(Ordering::SeqCst) <= BATCH_CONCURRENCY);
        assert!(mock.max_in_flight.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_batch_runs_on_spawned_task() {
        let mock = Arc::new(MockLlm::new(RESPONSE));
        let generator = PostGenerator::new(mock, Duration::from_secs(5));
        let requests = vec![
            PromptRequest::new("first", AudienceType::Business),
            PromptRequest::new("second", AudienceType::Business),
        ];

        let results = tokio::spawn(async move { generator.generate_batch(&requests).await })
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_fallback_response_is_still_a_post() {
        let mock = Arc::new(MockLlm::new("Just some text without markers."));
        let generator = PostGenerator::new(mock, Duration::from_secs(5));

        let post = generator
            .generate(&PromptRequest::new("x", AudienceType::Business))
            .await
            .unwrap();
        assert!(post.fallback);
        assert_eq!(post.tone, crate::parser::DEFAULT_TONE);
    }
}
