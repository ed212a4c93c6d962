//! Run command - execute the release pipeline

use crate::cli::args::RunArgs;
use crate::cache::{CacheStore, Restored};
use crate::config::{Config, ConfigManager};
use crate::creds::{AccountKeys, EcrExchange};
use crate::engine::DockerEngine;
use crate::error::{SlipwayError, SlipwayResult};
use crate::pipeline::{PipelineContext, ReleasePipeline, ReleaseReport, RunInputs};
use crate::repo::GitRepo;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> SlipwayResult<()> {
    let project_dir = resolve_project_dir(args.project.as_ref())?;
    debug!("Project directory: {}", project_dir.display());

    // Environment inputs are read exactly once, here
    let inputs = RunInputs::from_env(config)?;
    let ctx = PipelineContext::prepare(config, &inputs, &project_dir, args.skip_tag)?;

    let store = CacheStore::new(cache_root(config));

    if args.dry_run {
        print_plan(&ctx, &store);
        return Ok(());
    }

    let keys = AccountKeys::from_env()?;
    let exchange = EcrExchange::new();
    let engine = DockerEngine::new();
    let repo = GitRepo::new(project_dir.clone(), ctx.remote.clone());

    let pb = create_progress_bar("Starting release pipeline...");
    let pipeline = ReleasePipeline::new(&exchange, &engine, &store, &repo);
    let result = pipeline
        .execute(&ctx, &keys, &|msg: &str| {
            pb.set_message(format!("{}...", msg));
        })
        .await;
    pb.finish_and_clear();

    let report = result?;
    print_report(&report);
    Ok(())
}

/// Cache store root: configured dir, or the state directory
pub fn cache_root(config: &Config) -> PathBuf {
    config
        .cache
        .dir
        .clone()
        .unwrap_or_else(ConfigManager::cache_dir)
}

fn resolve_project_dir(project: Option<&PathBuf>) -> SlipwayResult<PathBuf> {
    if let Some(path) = project {
        return path.canonicalize().map_err(|e| {
            SlipwayError::io(format!("resolving project path {}", path.display()), e)
        });
    }

    env::current_dir().map_err(|e| SlipwayError::io("getting current directory", e))
}

fn print_plan(ctx: &PipelineContext, store: &CacheStore) {
    println!("{}", style("Release plan").bold().cyan());
    println!();
    println!("  Version:  {}", style(&ctx.version).cyan());
    println!("  Platform: {}", ctx.platform);
    for tag in ctx.image_tags() {
        println!("  Tag:      {}", tag.reference());
    }
    println!();
    println!("{}", style("Cache domains").bold());
    for domain_key in &ctx.keys {
        let status = match store.restore(domain_key.domain, &domain_key.key) {
            Restored::Hit(_) => style("hit").green(),
            Restored::Miss => style("miss").dim(),
        };
        println!(
            "  {} {} [{}]",
            style("•").cyan(),
            domain_key.key,
            status
        );
    }
    println!();
    println!(
        "  Revision tag: {}",
        if ctx.skip_tag {
            style("skipped").dim().to_string()
        } else {
            ctx.version.to_string()
        }
    );
}

fn print_report(report: &ReleaseReport) {
    println!(
        "{} Published {}",
        style("✓").green(),
        style(&report.version).cyan()
    );
    println!("  Digest: {}", report.digest);
    for tag in &report.tags {
        println!("  Pushed: {}", tag);
    }
    for outcome in &report.cache {
        println!(
            "  Cache:  {} ({})",
            outcome.key,
            if outcome.hit { "hit" } else { "miss" }
        );
    }
    if !report.layer_cache_saved {
        println!(
            "{} Layer cache was not persisted; the next run will rebuild it",
            style("!").yellow()
        );
    }
    match &report.revision_tag {
        Some(tag) => println!("  Tagged: {}", tag),
        None => println!("  Revision tagging skipped (--skip-tag)"),
    }
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
