//! finroute CLI
//!
//! Routes financial questions to a retrieval engine or a data-analysis agent.

use anyhow::Result;
use clap::Parser;
use finroute_core::error::exit_codes;
use finroute_core::{Config, FinRouteError};
use std::process::ExitCode;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Core errors keep their own exit code; anything else is a general failure
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<FinRouteError>()
        .map_or(exit_codes::GENERAL_ERROR, FinRouteError::exit_code)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from(&cli.config)?;

    match cli.command {
        Commands::BuildIndex(args) => commands::build_index::run(args, &config).await,
        Commands::Classify(args) => commands::ask::run_classify(args, &config, cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, &config, cli.format, cli.verbose).await,
        Commands::Import(args) => commands::import::run(args, &config, cli.format).await,
        Commands::Serve(args) => commands::serve::run(args, &config).await,
    }
}
