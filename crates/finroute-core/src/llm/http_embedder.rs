//! HTTP-based embedder using an OpenAI-compatible embeddings endpoint

use super::Embedder;
use crate::config::LLMServiceConfig;
use crate::error::{FinRouteError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dimensions reported when the config does not name them
const DEFAULT_DIMENSIONS: usize = 1536;

/// Embedder that uses external HTTP service (OpenAI, vLLM, etc.)
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FinRouteError::Http)?;
        let dimensions = config.embedding_dimensions.unwrap_or(DEFAULT_DIMENSIONS);

        Ok(Self {
            http_client,
            config,
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| FinRouteError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            index: usize,
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let url = format!(
            "{}/v1/embeddings",
            self.config.embeddings_url().trim_end_matches('/')
        );

        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinRouteError::ExternalError(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let mut embed_response: EmbedResponse = response.json().await?;
        if embed_response.data.len() != texts.len() {
            return Err(FinRouteError::Llm(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embed_response.data.len()
            )));
        }

        embed_response.data.sort_by_key(|d| d.index);
        Ok(embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
