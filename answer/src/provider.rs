//! Answer providers.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnswerError, Result};
use crate::prompt::{ChatMessage, build_messages};
use crate::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Trait for language-model answer providers.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Answer `question` using only `contexts`.
    async fn answer(&self, question: &str, contexts: &[String]) -> Result<String>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI-compatible chat-completion provider.
pub struct OpenAIChatProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChatProvider {
    /// Create a provider with no API key for the public OpenAI endpoint.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 500,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the response length limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Model used for completions.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OpenAIChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerProvider for OpenAIChatProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn answer(&self, question: &str, contexts: &[String]) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AnswerError::ProviderNotConfigured)?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(question, contexts),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Requesting answer from {} with {} context documents",
            self.model,
            contexts.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            warn!("Chat API rate limited, retry after {retry_after}s");
            return Err(AnswerError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat API returned {status}");
            return Err(AnswerError::ApiRequest {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnswerError::InvalidResponse("no answer in response".to_string()))?;

        Ok(content.trim().to_string())
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
