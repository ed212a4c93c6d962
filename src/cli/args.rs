//! CLI argument definitions using clap derive

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cache::CacheDomain;

/// Slipway - Release Pipeline Orchestrator
///
/// Builds a versioned container image, publishes it under two tags,
/// and records the release by tagging the source revision.
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SLIPWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .slipway.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the release pipeline
    Run(RunArgs),

    /// Print the version this run would produce
    Version(VersionArgs),

    /// Inspect or clear the build cache store
    Cache(CacheArgs),

    /// Check external tools and credentials
    Status,

    /// Show configuration
    Config(ConfigArgs),

    /// Initialize a project-local .slipway.toml config
    Init(InitArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Project directory (defaults to current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Print the resolved plan without invoking any external tool
    #[arg(long)]
    pub dry_run: bool,

    /// Publish the image but do not tag the source revision
    #[arg(long)]
    pub skip_tag: bool,
}

/// Arguments for the version command
#[derive(Parser, Debug)]
pub struct VersionArgs {
    /// Calendar date to resolve with (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Run ordinal (defaults to SLIPWAY_RUN_NUMBER)
    #[arg(long)]
    pub ordinal: Option<u32>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show each domain's computed key and store status
    Keys {
        /// Project directory (defaults to current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Remove stored cache entries
    Clear {
        /// Only clear one domain
        #[arg(long, value_enum)]
        domain: Option<DomainArg>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

/// Cache domain selector
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DomainArg {
    Dependency,
    Package,
    Layer,
}

impl From<DomainArg> for CacheDomain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Dependency => CacheDomain::Dependency,
            DomainArg::Package => CacheDomain::Package,
            DomainArg::Layer => CacheDomain::Layer,
        }
    }
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective merged configuration
    Show,

    /// Print the global config file path
    Path,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing .slipway.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got {:?}", raw))
}
