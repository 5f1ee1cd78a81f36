//! Retrieval-augmented answers about company descriptions

use super::QueryEngine;
use crate::error::Result;
use crate::index::{Retriever, ScoredPassage};
use crate::llm::LLMClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Number of retrieved passages placed into the prompt
pub const CONTEXT_PASSAGES: usize = 3;

/// Join the top passages' text with single spaces, in ranked order
pub fn assemble_context(results: &[ScoredPassage]) -> String {
    results
        .iter()
        .take(CONTEXT_PASSAGES)
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill the answer template with retrieved context and the raw question
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        r#"
You are a knowledgeable assistant specializing in company information and market trends. Use the following information to answer the user's question in a natural, conversational manner. Don't mention the source of your information unless specifically asked.
If the question is not related to stock analysis or financial markets, kindly inform the user that the query falls outside the platform's expertise. In your response, directly include the stock symbol in square brackets [] immediately following any company name, like ... company_name [symbol] ... Do NOT use parentheses () for symbols. Always use square brackets []. Use your own knowledge to provide the correct symbols.
Avoid using markdown symbols like ** or * in your responses.

Context: {}

User's question: {}

Your conversational Answer:"#,
        context, question
    )
}

/// Answers descriptive and comparative questions from the vector store
pub struct GeneralQueryEngine {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn LLMClient>,
    retrieval_depth: usize,
}

impl GeneralQueryEngine {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn LLMClient>,
        retrieval_depth: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            retrieval_depth: retrieval_depth.max(CONTEXT_PASSAGES),
        }
    }
}

#[async_trait]
impl QueryEngine for GeneralQueryEngine {
    async fn answer(&self, query: &str) -> Result<String> {
        let results = self.retriever.search(query, self.retrieval_depth).await?;
        tracing::debug!(
            "Retrieved {} passages (using top {})",
            results.len(),
            CONTEXT_PASSAGES.min(results.len())
        );

        let context = assemble_context(&results);
        let prompt = render_prompt(&context, query);

        self.generator.complete(&prompt).await
    }

    fn name(&self) -> &'static str {
        "general"
    }
}
