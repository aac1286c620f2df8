//! pack - build container images from application source
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pack::cli::{Cli, Commands};
use pack::config::ConfigManager;
use pack::error::PackResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

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

async fn run() -> PackResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("pack=warn"),
        1 => EnvFilter::new("pack=info"),
        _ => EnvFilter::new("pack=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Build(args) => pack::cli::commands::build(args, &config).await,
        Commands::Cache(args) => pack::cli::commands::cache(args, &config).await,
        Commands::Status => pack::cli::commands::status(&config).await,
        Commands::Config(args) => {
            pack::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
