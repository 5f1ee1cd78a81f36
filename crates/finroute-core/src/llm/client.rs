//! HTTP client for OpenAI-compatible chat completion services

use crate::config::LLMServiceConfig;
use crate::error::{FinRouteError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Trait for LLM service clients
///
/// Every call goes to the service exactly once: implementations must not
/// retry or cache.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Send a single user prompt and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat_completion(vec![ChatMessage::user(prompt)]).await
    }
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat client
pub struct OpenAIClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
}

impl OpenAIClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FinRouteError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let start = Instant::now();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        };

        let mut req = self.http_client.post(self.completions_url()).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinRouteError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| FinRouteError::Llm("No response from LLM".to_string()))?
            .message
            .content;

        tracing::debug!(
            "Chat completion from {} took {}ms",
            self.config.model,
            start.elapsed().as_millis()
        );

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
