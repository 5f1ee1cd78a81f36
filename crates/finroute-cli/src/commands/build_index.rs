//! Build-index command

use crate::app::BuildIndexArgs;
use crate::progress::ProgressReporter;
use finroute_core::index::BuildProgress;
use finroute_core::{build_index, load_corpus, Config, Embedder, HashingEmbedder, HttpEmbedder};
use anyhow::Result;
use std::sync::Arc;

pub async fn run(args: BuildIndexArgs, config: &Config) -> Result<()> {
    let corpus_path = args
        .corpus
        .unwrap_or_else(|| config.datasets.company_overview.clone());
    let output = args.output.unwrap_or_else(|| config.index_path.clone());

    let passages = load_corpus(&corpus_path)?;
    println!("Loaded {} passages from {}", passages.len(), corpus_path.display());

    let embedder: Box<dyn Embedder> = if args.offline {
        Box::new(HashingEmbedder::new(args.dimensions))
    } else {
        Box::new(HttpEmbedder::from_config(config.llm_service.clone())?)
    };
    println!("Embedding with {}", embedder.model_name());

    let reporter = Arc::new(ProgressReporter::new());
    let progress = reporter.clone();
    let (store, stats) = build_index(
        passages,
        embedder.as_ref(),
        Some(Box::new(move |p: BuildProgress| progress.report(p))),
    )
    .await?;
    reporter.finish();

    store.save(&output)?;

    println!(
        "Indexed {} passages ({} dimensions, {} batches) in {} ms",
        stats.passages, stats.dimensions, stats.batches, stats.elapsed_ms
    );
    println!("Wrote {}", output.display());
    Ok(())
}
