//! Status command - check external tools and credentials

use crate::config::Config;
use crate::creds::{ACCESS_KEY_VAR, SECRET_KEY_VAR};
use crate::error::SlipwayResult;
use crate::pipeline::RUN_NUMBER_VAR;
use console::{style, Emoji};
use std::process::Stdio;
use tokio::process::Command;

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Oldest Docker release that bundles buildx by default
const MIN_DOCKER_MAJOR: u64 = 23;

/// Execute the status command
pub async fn execute(config: &Config) -> SlipwayResult<()> {
    println!("{}", style("Slipway System Status").bold().cyan());
    println!();

    println!("{}", style("Container engine:").bold());
    check_docker().await;
    check_buildx().await;

    println!();
    println!("{}", style("External CLIs:").bold());
    check_cli("aws", &["--version"], "install the AWS CLI v2").await;
    check_cli("git", &["--version"], "install git").await;

    println!();
    println!("{}", style("Registry:").bold());
    match &config.registry.endpoint {
        Some(endpoint) => println!("  {} Endpoint: {}", CHECK, endpoint),
        None => println!(
            "  {} {} - run: slipway init",
            CROSS,
            style("Endpoint not configured").red()
        ),
    }

    println!();
    println!("{}", style("Environment:").bold());
    check_env(RUN_NUMBER_VAR);
    check_env(ACCESS_KEY_VAR);
    check_env(SECRET_KEY_VAR);

    Ok(())
}

async fn check_docker() {
    let output = Command::new("docker")
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(o) if o.status.success() => o,
        _ => {
            println!(
                "  {} {} - install Docker",
                CROSS,
                style("docker not found").red()
            );
            return;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    match parse_docker_version(&stdout) {
        Some(version) if version.major >= MIN_DOCKER_MAJOR => {
            println!("  {} docker {}", CHECK, version);
        }
        Some(version) => {
            println!(
                "  {} docker {} - {} or newer recommended for buildx",
                WARN,
                version,
                MIN_DOCKER_MAJOR
            );
        }
        None => {
            println!("  {} docker (version unknown)", CHECK);
        }
    }
}

async fn check_buildx() {
    let available = Command::new("docker")
        .args(["buildx", "version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false);

    if available {
        println!("  {} buildx available", CHECK);
    } else {
        println!(
            "  {} {} - run: docker buildx install",
            CROSS,
            style("buildx not available").red()
        );
    }
}

/// Parse "Docker version 27.3.1, build ..." into a semver version
fn parse_docker_version(raw: &str) -> Option<semver::Version> {
    let after = raw.split("version ").nth(1)?;
    let number = after.split([',', ' ', '\n']).next()?;
    semver::Version::parse(number.trim()).ok()
}

async fn check_cli(name: &str, args: &[&str], hint: &str) {
    let found = Command::new(name)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false);

    if found {
        println!("  {} {}", CHECK, name);
    } else {
        println!(
            "  {} {} - {}",
            CROSS,
            style(format!("{} not found", name)).red(),
            hint
        );
    }
}

/// Report presence of an environment variable without printing its value
fn check_env(var: &str) {
    if std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false) {
        println!("  {} {} is set", CHECK, var);
    } else {
        println!("  {} {} is not set", WARN, var);
    }
}
