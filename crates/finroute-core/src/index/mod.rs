//! Vector index over the company-overview corpus
//!
//! - [`corpus`] turns CSV rows into [`Passage`]s
//! - [`VectorStore`] embeds passages, answers nearest-neighbor queries and
//!   round-trips through a binary blob on disk
//! - [`Retriever`] is the narrow search interface the general engine uses

mod ann_index;
mod builder;
pub mod corpus;
mod vector_store;

pub use ann_index::{AnnIndex, ANN_THRESHOLD};
pub use builder::{build_index, BuildProgress, BuildStats};
pub use corpus::{load_corpus, Passage};
pub use vector_store::{cosine_similarity, VectorRetriever, VectorStore};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// Passage text
    pub text: String,
    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}

/// Similarity search interface
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` passages ranked by descending similarity
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>>;
}
