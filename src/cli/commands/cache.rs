//! Cache command - inspect or clear the build cache store

use crate::cache::{compute_keys, CacheStore, DomainKey, Restored};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::commands::run::cache_root;
use crate::config::Config;
use crate::error::{SlipwayError, SlipwayResult};
use console::style;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SlipwayResult<()> {
    let store = CacheStore::new(cache_root(config));

    match args.action {
        CacheAction::Keys { project, format } => show_keys(&store, config, project, format),
        CacheAction::Clear { domain, yes } => clear(&store, domain.map(Into::into), yes),
    }
}

fn show_keys(
    store: &CacheStore,
    config: &Config,
    project: Option<PathBuf>,
    format: OutputFormat,
) -> SlipwayResult<()> {
    let project_dir = match project {
        Some(p) => p.canonicalize().unwrap_or(p),
        None => env::current_dir().map_err(|e| SlipwayError::io("getting current directory", e))?,
    };

    let keys = compute_keys(&config.cache, &project_dir)?;

    match format {
        OutputFormat::Table => print_keys_table(store, &keys),
        OutputFormat::Json => print_keys_json(store, &keys)?,
        OutputFormat::Plain => {
            for domain_key in &keys {
                println!("{}", domain_key.key);
            }
        }
    }

    Ok(())
}

fn print_keys_table(store: &CacheStore, keys: &[DomainKey]) {
    println!("{:<12} {:<24} {:<8} SOURCE", "DOMAIN", "KEY", "STATUS");
    println!("{}", "-".repeat(80));

    for domain_key in keys {
        let status = match store.restore(domain_key.domain, &domain_key.key) {
            Restored::Hit(_) => style("hit").green().to_string(),
            Restored::Miss => style("miss").dim().to_string(),
        };
        println!(
            "{:<12} {:<24} {:<8} {}",
            domain_key.domain.to_string(),
            domain_key.key.to_string(),
            status,
            domain_key.source
        );
    }
}

fn print_keys_json(store: &CacheStore, keys: &[DomainKey]) -> SlipwayResult<()> {
    #[derive(serde::Serialize)]
    struct KeyJson {
        domain: String,
        key: String,
        source: String,
        hit: bool,
    }

    let rows: Vec<KeyJson> = keys
        .iter()
        .map(|domain_key| KeyJson {
            domain: domain_key.domain.to_string(),
            key: domain_key.key.to_string(),
            source: domain_key.source.to_string(),
            hit: store.restore(domain_key.domain, &domain_key.key).is_hit(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn clear(
    store: &CacheStore,
    domain: Option<crate::cache::CacheDomain>,
    skip_confirm: bool,
) -> SlipwayResult<()> {
    if !skip_confirm {
        let scope = match domain {
            Some(d) => format!("the {} domain", d),
            None => "all domains".to_string(),
        };
        print!("Clear cached entries for {}? [y/N] ", scope);
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = store.clear(domain)?;
    println!("{} cleared {} cache entr(ies)", style("✓").green(), removed);
    Ok(())
}
