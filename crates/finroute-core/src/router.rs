//! Two-stage query classification and dispatch
//!
//! A cheap keyword-intent gate runs first. Only when it says no does a
//! second, example-driven prompt decide between the analytical and general
//! engines. Exactly one engine answers each query.

use crate::config::Config;
use crate::data::Datasets;
use crate::engine::{AnalyticalQueryEngine, GeneralQueryEngine, QueryEngine};
use crate::error::Result;
use crate::index::{VectorRetriever, VectorStore};
use crate::llm::{embedder_for_model, LLMClient, OpenAIClient};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

lazy_static! {
    static ref YES_NO_PROMPT: Regex = Regex::new(r"\by\s*/\s*n\b").unwrap();
    static ref WORD: Regex = Regex::new(r"[a-z0-9]+").unwrap();
    static ref LABEL: Regex =
        Regex::new(r"\b(not\s+|non[\s-]?)?(analytical|general)\b").unwrap();
}

/// Which engine a query is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Analytical,
    General,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Analytical => "analytical",
            Classification::General => "general",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt for the keyword-intent gate
pub fn gate_prompt(query: &str) -> String {
    format!(
        "Does the following question ask anything about cash flow, news sentiment, \
         quarterly earnings, or stock weekly data? Return 'y' if yes, 'n' if no. \
         Question: {}  y/n:",
        query
    )
}

/// Prompt for the example-driven fallback classifier
pub fn classification_prompt(query: &str) -> String {
    format!(
        r#"Classify the following question as either "analytical" or "general":

Question: {}

An "analytical" question typically involves numerical analysis, statistics, or specific data calculations. It often requires working with structured data tables. Examples include:
- What is the average stock price for a specific company?
- Which company has the highest stock price?
- How has the stock price of a company changed over time?

A "general" question is broader and relates to company descriptions, products, services, or comparisons that don't require specific data analysis. These questions can typically be answered based on general knowledge about companies. Examples include:
- What are the main products of Adobe?
- Which companies compete with Facebook in social media?
- What is the primary business focus of Google?
- How does Microsoft's product portfolio compare to Apple's?

Classification:
"#,
        query
    )
}

/// Gate reply is affirmative when any word in it is `y` or `yes`
///
/// An echoed `y/n` choice is removed first so it never counts.
pub fn is_affirmative(reply: &str) -> bool {
    let lower = reply.trim().to_lowercase();
    let stripped = YES_NO_PROMPT.replace_all(&lower, " ");
    WORD
        .find_iter(&stripped)
        .any(|word| matches!(word.as_str(), "y" | "yes"))
}

/// First label mentioned wins; a negated label flips; no label means general
pub fn parse_label(reply: &str) -> Classification {
    let lower = reply.to_lowercase();
    let Some(caps) = LABEL.captures(&lower) else {
        return Classification::General;
    };

    let negated = caps.get(1).is_some();
    match (&caps[2], negated) {
        ("analytical", false) | ("general", true) => Classification::Analytical,
        _ => Classification::General,
    }
}

/// Run the gate and, when it declines, the fallback classifier
pub async fn classify(oracle: &dyn LLMClient, query: &str) -> Result<Classification> {
    let gate = oracle.complete(&gate_prompt(query)).await?;
    if is_affirmative(&gate) {
        tracing::debug!("Gate reply {:?} is affirmative", gate.trim());
        return Ok(Classification::Analytical);
    }

    let label = oracle.complete(&classification_prompt(query)).await?;
    let classification = parse_label(&label);
    tracing::debug!("Fallback reply {:?} -> {}", label.trim(), classification);
    Ok(classification)
}

/// Routes each query to exactly one engine
pub struct QueryRouter {
    oracle: Arc<dyn LLMClient>,
    analytical: Arc<dyn QueryEngine>,
    general: Arc<dyn QueryEngine>,
}

impl QueryRouter {
    pub fn new(
        oracle: Arc<dyn LLMClient>,
        analytical: Arc<dyn QueryEngine>,
        general: Arc<dyn QueryEngine>,
    ) -> Self {
        Self {
            oracle,
            analytical,
            general,
        }
    }

    /// Wire both engines from configuration
    ///
    /// Loads the persisted vector store and the four datasets once; both
    /// are shared read-only for the router's lifetime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(VectorStore::load(&config.index_path)?);
        let embedder =
            embedder_for_model(store.model_name(), store.dimensions(), &config.llm_service)?;
        let retriever = Arc::new(VectorRetriever::new(store, embedder));

        let datasets = Arc::new(Datasets::load(&config.datasets)?);

        let oracle: Arc<dyn LLMClient> = Arc::new(OpenAIClient::new(config.llm_service.clone())?);
        let analyst: Arc<dyn LLMClient> =
            Arc::new(OpenAIClient::new(config.llm_service.for_analysis())?);

        let general = Arc::new(GeneralQueryEngine::new(
            retriever,
            oracle.clone(),
            config.retrieval_depth,
        ));
        let analytical = Arc::new(AnalyticalQueryEngine::new(
            analyst,
            datasets,
            config.iteration_budget,
        ));

        Ok(Self::new(oracle, analytical, general))
    }

    /// Decide which engine should answer. Oracle errors propagate.
    pub async fn classify(&self, query: &str) -> Result<Classification> {
        classify(self.oracle.as_ref(), query).await
    }

    /// Classify and answer, returning both
    pub async fn route_with_classification(&self, query: &str) -> Result<(Classification, String)> {
        let classification = self.classify(query).await?;
        let engine = match classification {
            Classification::Analytical => &self.analytical,
            Classification::General => &self.general,
        };
        tracing::info!("Question type: {} ({} engine)", classification, engine.name());

        let answer = engine.answer(query).await?;
        Ok((classification, answer))
    }

    /// Classify and return the chosen engine's answer verbatim
    pub async fn route(&self, query: &str) -> Result<String> {
        Ok(self.route_with_classification(query).await?.1)
    }
}
