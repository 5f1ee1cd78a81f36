//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use finroute_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "finroute")]
#[command(
    author,
    version,
    about = "Answer questions about companies and their financial data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (YAML)
    #[arg(long, global = true, env = "FINROUTE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed the company-overview corpus and write the index blob
    BuildIndex(BuildIndexArgs),

    /// Show which engine a question would be routed to
    Classify(QueryArgs),

    /// Answer a question
    Ask(AskArgs),

    /// Load the dataset CSVs into the document store
    Import(ImportArgs),

    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct BuildIndexArgs {
    /// Corpus CSV (defaults to datasets.company_overview)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Output path (defaults to index_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use the offline feature-hashing embedder instead of the embeddings service
    #[arg(long)]
    pub offline: bool,

    /// Vector size for --offline
    #[arg(long, default_value = "256")]
    pub dimensions: usize,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Question text
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    pub query: Vec<String>,

    /// Skip classification and use this engine
    #[arg(long, value_enum, default_value = "auto")]
    pub engine: EngineChoice,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Import only this collection
    #[arg(short, long)]
    pub collection: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Socket address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EngineChoice {
    Auto,
    General,
    Analytical,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Cli,
    Json,
}

impl QueryArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}
