//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completion against OpenAI-compatible services
//! - Embedding generation (HTTP service or offline feature hashing)

mod client;
mod hashing_embedder;
mod http_embedder;
mod traits;

pub use client::{ChatMessage, LLMClient, OpenAIClient};
pub use hashing_embedder::{HashingEmbedder, HASHING_MODEL_NAME};
pub use http_embedder::HttpEmbedder;
pub use traits::*;

use crate::config::LLMServiceConfig;
use crate::error::Result;
use std::sync::Arc;

/// Embedder matching an index built with `model`
///
/// Indexes built offline with feature hashing are queried the same way;
/// anything else goes to the configured embeddings service.
pub fn embedder_for_model(
    model: &str,
    dimensions: usize,
    config: &LLMServiceConfig,
) -> Result<Arc<dyn Embedder>> {
    if model == HASHING_MODEL_NAME {
        return Ok(Arc::new(HashingEmbedder::new(dimensions)));
    }

    let mut config = config.clone();
    config.embedding_model = model.to_string();
    config.embedding_dimensions = Some(dimensions);
    Ok(Arc::new(HttpEmbedder::from_config(config)?))
}
