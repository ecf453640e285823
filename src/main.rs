//! handle-resolver CLI entry point.

use anyhow::Result;
use clap::Parser;

use handle_resolver::cli::commands::{self, add, cache, resolve};
use handle_resolver::cli::{Cli, Commands};
use handle_resolver::infrastructure::config::ConfigLoader;
use handle_resolver::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_resolver::cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    let service = commands::start_service(&config, cli.ephemeral)?;

    let result = match cli.command {
        Commands::Resolve(args) => resolve::execute(args, &service, cli.json).await,
        Commands::Add(args) => add::execute(args, &service, cli.json).await,
        Commands::List => cache::list(&service, cli.json).await,
        Commands::Stats => cache::stats(&service, cli.json).await,
        Commands::Clear(args) => cache::clear(args, &service, cli.json).await,
    };

    if let Err(err) = service.shutdown().await {
        tracing::warn!(error = %err, "resolution service stopped before shutdown");
    }
    result
}
