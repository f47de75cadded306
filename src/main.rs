//! cache-locator CLI entry point that dispatches to subcommands.

use cache_locator::cli::{Cli, Commands};
use cache_locator::config::ConfigManager;
use cache_locator::error::LocatorResult;
use cache_locator::logging::init_logging;
use clap::Parser;
use console::style;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LocatorResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, config.general.log_format == "json");

    match cli.command {
        Commands::Resolve(args) => cache_locator::cli::commands::resolve(args, &config).await,
        Commands::Devices(args) => cache_locator::cli::commands::devices(args, &config).await,
        Commands::Shared => cache_locator::cli::commands::shared(&config).await,
        Commands::Monitor(args) => cache_locator::cli::commands::monitor(args, &config).await,
        Commands::Config(args) => {
            cache_locator::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
