//! Offline vector store construction

use super::corpus::Passage;
use super::vector_store::VectorStore;
use crate::error::Result;
use crate::llm::Embedder;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Instant;

const BATCH_SIZE: usize = 32;
const MAX_CONCURRENT_BATCHES: usize = 4;

/// Embedding progress
#[derive(Debug, Clone)]
pub struct BuildProgress {
    pub total_passages: usize,
    pub embedded_passages: usize,
}

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub passages: usize,
    pub batches: usize,
    pub dimensions: usize,
    pub elapsed_ms: u128,
}

/// Embed every passage and assemble a [`VectorStore`].
///
/// Batches are sent concurrently but reassembled in corpus order, so the
/// store's entry order always matches `passages`.
pub async fn build_index(
    passages: Vec<Passage>,
    embedder: &dyn Embedder,
    progress: Option<Box<dyn Fn(BuildProgress) + Send + Sync>>,
) -> Result<(VectorStore, BuildStats)> {
    let start = Instant::now();
    let total = passages.len();

    let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
    let batches: Vec<&[String]> = texts.chunks(BATCH_SIZE).collect();
    let batch_count = batches.len();

    tracing::info!(
        "Embedding {} passages in {} batches with {}",
        total,
        batch_count,
        embedder.model_name()
    );

    let progress = progress.as_deref();
    let embedded: Vec<Vec<Vec<f32>>> = stream::iter(batches)
        .enumerate()
        .map(|(idx, batch)| async move {
            tracing::debug!("Embedding batch {}/{}", idx + 1, batch_count);
            let vectors = embedder.embed_batch(batch).await?;
            if let Some(report) = progress {
                report(BuildProgress {
                    total_passages: total,
                    embedded_passages: ((idx + 1) * BATCH_SIZE).min(total),
                });
            }
            Ok::<_, crate::error::FinRouteError>(vectors)
        })
        .buffered(MAX_CONCURRENT_BATCHES)
        .try_collect()
        .await?;

    let embeddings: Vec<Vec<f32>> = embedded.into_iter().flatten().collect();
    let store = VectorStore::from_embeddings(embedder.model_name(), passages, embeddings)?;

    let stats = BuildStats {
        passages: store.len(),
        batches: batch_count,
        dimensions: store.dimensions(),
        elapsed_ms: start.elapsed().as_millis(),
    };

    Ok((store, stats))
}
