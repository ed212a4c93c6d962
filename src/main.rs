//! Slipway - Release Pipeline Orchestrator
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use slipway::cli::{Cli, Commands};
use slipway::config::ConfigManager;
use slipway::error::SlipwayResult;
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

async fn run() -> SlipwayResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("slipway=warn"),
        1 => EnvFilter::new("slipway=info"),
        _ => EnvFilter::new("slipway=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        // Init and version don't need config loading
        Commands::Init(args) => slipway::cli::commands::init(args).await,
        Commands::Version(args) => slipway::cli::commands::version(args).await,
        command => {
            let config = load_config(cli.config, cli.no_local).await?;
            match command {
                Commands::Init(_) | Commands::Version(_) => unreachable!("handled above"),
                Commands::Run(args) => slipway::cli::commands::run(args, &config).await,
                Commands::Cache(args) => slipway::cli::commands::cache(args, &config).await,
                Commands::Status => slipway::cli::commands::status(&config).await,
                Commands::Config(args) => slipway::cli::commands::config(args, &config).await,
            }
        }
    }
}

async fn load_config(
    path: Option<std::path::PathBuf>,
    no_local: bool,
) -> SlipwayResult<slipway::config::Config> {
    let config_manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    // Find local config unless --no-local is set
    let local_config_path = if no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| slipway::error::SlipwayError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    config_manager
        .load_merged(local_config_path.as_deref())
        .await
}
