//! Classify and ask commands

use crate::app::{AskArgs, EngineChoice, OutputFormat, QueryArgs};
use crate::output::{format_answer, format_classification, format_steps};
use anyhow::Result;
use finroute_core::llm::embedder_for_model;
use finroute_core::router::classify;
use finroute_core::{
    AnalyticalQueryEngine, Classification, Config, Datasets, FinRouteError, GeneralQueryEngine,
    OpenAIClient, QueryEngine, QueryRouter, VectorRetriever, VectorStore,
};
use std::sync::Arc;

fn require_query(query: String) -> Result<String> {
    if query.trim().is_empty() {
        return Err(FinRouteError::InvalidInput("Query is required".to_string()).into());
    }
    Ok(query)
}

pub async fn run_classify(args: QueryArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = require_query(args.text())?;
    let oracle = OpenAIClient::new(config.llm_service.clone())?;

    let classification = classify(&oracle, &query).await?;
    print!("{}", format_classification(&query, classification, format));
    Ok(())
}

pub async fn run(args: AskArgs, config: &Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let engine = args.engine;
    let query = require_query(args.text())?;

    let (classification, answer) = match engine {
        EngineChoice::Auto => {
            let router = QueryRouter::from_config(config)?;
            let (classification, answer) = router.route_with_classification(&query).await?;
            (Some(classification), answer)
        }
        EngineChoice::General => (None, general_engine(config)?.answer(&query).await?),
        EngineChoice::Analytical => {
            let datasets = Arc::new(Datasets::load(&config.datasets)?);
            let analyst = Arc::new(OpenAIClient::new(config.llm_service.for_analysis())?);
            let agent = AnalyticalQueryEngine::new(analyst, datasets, config.iteration_budget);

            let run = agent.run(&query).await?;
            if verbose {
                eprint!("{}", format_steps(&run.steps));
            }
            (None, run.answer)
        }
    };

    print!(
        "{}",
        format_answer(&query, classification.or(fixed(engine)), &answer, format)
    );
    Ok(())
}

fn fixed(engine: EngineChoice) -> Option<Classification> {
    match engine {
        EngineChoice::Auto => None,
        EngineChoice::General => Some(Classification::General),
        EngineChoice::Analytical => Some(Classification::Analytical),
    }
}

fn general_engine(config: &Config) -> Result<GeneralQueryEngine> {
    let store = Arc::new(VectorStore::load(&config.index_path)?);
    let embedder = embedder_for_model(store.model_name(), store.dimensions(), &config.llm_service)?;
    let retriever = Arc::new(VectorRetriever::new(store, embedder));
    let generator = Arc::new(OpenAIClient::new(config.llm_service.clone())?);
    Ok(GeneralQueryEngine::new(
        retriever,
        generator,
        config.retrieval_depth,
    ))
}
