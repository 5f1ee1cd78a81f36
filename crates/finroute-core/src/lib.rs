//! finroute Core Library
//!
//! Question answering over company financial data.
//!
//! # Features
//! - Two-stage LLM classifier routing each question to one engine
//! - Retrieval-augmented answers over a persisted company-overview vector store
//! - Bounded analytical agent running typed operations over CSV datasets
//! - SQLite JSON document store backing the data API

pub mod config;
pub mod data;
pub mod db;
pub mod engine;
pub mod error;
pub mod index;
pub mod llm;
pub mod router;

pub use config::{Config, DatasetPaths, LLMServiceConfig, ServerConfig};
pub use data::{DatasetKind, Datasets, Table, TableOp};
pub use db::{Collection, Database, Record, RecordQuery, SortDirection};
pub use engine::{AnalyticalQueryEngine, GeneralQueryEngine, QueryEngine};
pub use error::{Error, FinRouteError, Result};
pub use index::{
    build_index, load_corpus, Passage, Retriever, ScoredPassage, VectorRetriever, VectorStore,
};
pub use llm::{
    ChatMessage, Embedder, HashingEmbedder, HttpEmbedder, LLMClient, OpenAIClient,
};
pub use router::{Classification, QueryRouter};

/// Crate version reported by the health endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
