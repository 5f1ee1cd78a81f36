//! In-memory vector store with binary persistence

use super::ann_index::AnnIndex;
use super::corpus::Passage;
use super::{Retriever, ScoredPassage};
use crate::error::{FinRouteError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Leading bytes of every serialized store
const MAGIC: &[u8; 4] = b"FRVS";

/// Snapshot layout version
const FORMAT_VERSION: u32 = 1;

/// Compute cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or
/// zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    passage: Passage,
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    model: String,
    dimensions: usize,
    entries: Vec<StoredEntry>,
}

/// Embedded passages plus a nearest-neighbor index over them
pub struct VectorStore {
    model: String,
    dimensions: usize,
    entries: Vec<StoredEntry>,
    ann: AnnIndex,
}

impl VectorStore {
    /// Assemble a store from passages and their precomputed embeddings
    pub fn from_embeddings(
        model: impl Into<String>,
        passages: Vec<Passage>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if passages.len() != embeddings.len() {
            return Err(FinRouteError::Index(format!(
                "{} passages but {} embeddings",
                passages.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(|e| e.len()).unwrap_or(0);
        if let Some((idx, bad)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != dimensions)
        {
            return Err(FinRouteError::Index(format!(
                "Embedding {} has {} dimensions, expected {}",
                idx,
                bad.len(),
                dimensions
            )));
        }

        let entries = passages
            .into_iter()
            .zip(embeddings)
            .map(|(passage, embedding)| StoredEntry { passage, embedding })
            .collect();

        Ok(Self::from_entries(model.into(), dimensions, entries))
    }

    fn from_entries(model: String, dimensions: usize, entries: Vec<StoredEntry>) -> Self {
        let vectors: Vec<Vec<f32>> = entries.iter().map(|e| e.embedding.clone()).collect();
        let ann = AnnIndex::build(&vectors);
        Self {
            model,
            dimensions,
            entries,
            ann,
        }
    }

    /// Serialize to the on-disk blob format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            version: FORMAT_VERSION,
            model: self.model.clone(),
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };

        let mut bytes = MAGIC.to_vec();
        bytes.extend(bincode::serialize(&snapshot)?);
        Ok(bytes)
    }

    /// Deserialize a blob produced by [`VectorStore::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let payload = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| FinRouteError::Index("Not a finroute vector store".to_string()))?;

        let snapshot: Snapshot = bincode::deserialize(payload)?;
        if snapshot.version != FORMAT_VERSION {
            return Err(FinRouteError::Index(format!(
                "Unsupported vector store version {} (expected {})",
                snapshot.version, FORMAT_VERSION
            )));
        }

        Ok(Self::from_entries(
            snapshot.model,
            snapshot.dimensions,
            snapshot.entries,
        ))
    }

    /// Write the blob to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        tracing::info!("Saved vector store ({} passages) to {:?}", self.len(), path);
        Ok(())
    }

    /// Read a blob from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            FinRouteError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read vector store {:?}: {}", path, e),
            ))
        })?;
        let store = Self::from_bytes(&bytes)?;
        tracing::info!(
            "Loaded vector store ({} passages, model {}, {} search) from {:?}",
            store.len(),
            store.model,
            if store.uses_ann() { "HNSW" } else { "exact" },
            path
        );
        Ok(store)
    }

    /// Nearest passages to `query`, by descending cosine similarity
    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Vec<ScoredPassage> {
        if k == 0 {
            return Vec::new();
        }

        let hits: Vec<(usize, f32)> = if self.ann.is_built() {
            self.ann.search(query, k)
        } else {
            let mut scored: Vec<(usize, f32)> = self
                .entries
                .iter()
                .enumerate()
                .map(|(idx, e)| (idx, cosine_similarity(query, &e.embedding)))
                .collect();
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            scored.truncate(k);
            scored
        };

        hits.into_iter()
            .map(|(idx, score)| ScoredPassage {
                text: self.entries[idx].passage.content.clone(),
                score,
            })
            .collect()
    }

    /// Whether searches go through the HNSW graph rather than a linear scan
    pub fn uses_ann(&self) -> bool {
        self.ann.is_built()
    }

    /// All stored passages, in insertion order
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries.iter().map(|e| &e.passage)
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// [`Retriever`] that embeds the query and searches a [`VectorStore`]
pub struct VectorRetriever {
    store: Arc<VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    pub fn new(store: Arc<VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        if store.model_name() != embedder.model_name() {
            tracing::warn!(
                "Vector store was built with {} but queries use {}",
                store.model_name(),
                embedder.model_name()
            );
        }
        Self { store, embedder }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        let query_vec = self.embedder.embed(query).await?;
        Ok(self.store.search_by_vector(&query_vec, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VectorStore {
        VectorStore::from_embeddings(
            "test-model",
            vec![
                Passage::new("north"),
                Passage::new("east"),
                Passage::new("north-east"),
            ],
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]],
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_mismatched() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let hits = store().search_by_vector(&[0.1, 1.0], 3);
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["north", "north-east", "east"]);
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
    }

    #[test]
    fn test_search_k_larger_than_store() {
        assert_eq!(store().search_by_vector(&[1.0, 0.0], 10).len(), 3);
        assert!(store().search_by_vector(&[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_bytes_roundtrip_preserves_results() {
        let original = store();
        let restored = VectorStore::from_bytes(&original.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.model_name(), "test-model");
        assert_eq!(restored.dimensions(), 2);
        let query = [0.3, 0.9];
        assert_eq!(
            original.search_by_vector(&query, 3),
            restored.search_by_vector(&query, 3)
        );
    }

    #[test]
    fn test_rejects_foreign_bytes() {
        assert!(VectorStore::from_bytes(b"not a store").is_err());
        assert!(VectorStore::from_bytes(b"FRVS\x01").is_err());
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let result = VectorStore::from_embeddings(
            "m",
            vec![Passage::new("a"), Passage::new("b")],
            vec![vec![1.0, 0.0], vec![1.0]],
        );
        assert!(result.is_err());

        let result = VectorStore::from_embeddings("m", vec![Passage::new("a")], vec![]);
        assert!(result.is_err());
    }
}
