//! HNSW approximate nearest neighbor index for vector search

use super::vector_store::cosine_similarity;
use instant_distance::{Builder, HnswMap, Search};

/// Minimum embedding count to justify building an ANN index.
/// Below this threshold, brute-force is fast enough.
pub const ANN_THRESHOLD: usize = 1000;

/// Fixed seed so that a deserialized store rebuilds the same graph
const HNSW_SEED: u64 = 0x5eed_f17e;

/// Wrapper for f32 vectors implementing instant_distance::Point
#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1.0 - cosine_similarity
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

/// HNSW-backed approximate nearest neighbor index keyed by entry position
pub struct AnnIndex {
    index: Option<HnswMap<EmbeddingPoint, usize>>,
    embedding_count: usize,
}

impl AnnIndex {
    /// Build over `vectors`, skipping the graph below [`ANN_THRESHOLD`]
    pub fn build(vectors: &[Vec<f32>]) -> Self {
        Self::build_with_threshold(vectors, ANN_THRESHOLD)
    }

    pub fn build_with_threshold(vectors: &[Vec<f32>], threshold: usize) -> Self {
        let count = vectors.len();

        if count < threshold.max(1) {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                count,
                threshold
            );
            return Self {
                index: None,
                embedding_count: count,
            };
        }

        let points: Vec<EmbeddingPoint> = vectors
            .iter()
            .map(|values| EmbeddingPoint {
                values: values.clone(),
            })
            .collect();
        let keys: Vec<usize> = (0..count).collect();

        let hnsw_map = Builder::default().seed(HNSW_SEED).build(points, keys);

        tracing::info!("Built ANN index with {} embeddings", count);
        Self {
            index: Some(hnsw_map),
            embedding_count: count,
        }
    }

    /// Search the ANN index for k nearest neighbors.
    /// Returns (entry position, cosine_similarity) pairs.
    /// Returns empty vec if index not built.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let map = match self.index.as_ref() {
            Some(m) => m,
            None => return vec![],
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| (*item.value, 1.0 - item.distance))
            .collect()
    }

    /// Whether the HNSW index has been built
    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Number of embeddings loaded (even if index wasn't built)
    pub fn len(&self) -> usize {
        self.embedding_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
