//! Answer-generation engines
//!
//! - [`GeneralQueryEngine`]: retrieval-augmented generation over the
//!   company-overview vector store
//! - [`AnalyticalQueryEngine`]: bounded plan/act agent over the tabular
//!   datasets

mod analytical;
mod general;

pub use analytical::{
    AgentRun, AgentStep, AnalyticalQueryEngine, ITERATION_LIMIT_MESSAGE,
};
pub use general::{assemble_context, render_prompt, GeneralQueryEngine, CONTEXT_PASSAGES};

use crate::error::Result;
use async_trait::async_trait;

/// Single entry point shared by both engines
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Answer a natural-language query
    async fn answer(&self, query: &str) -> Result<String>;

    /// Short engine name for logs
    fn name(&self) -> &'static str;
}
