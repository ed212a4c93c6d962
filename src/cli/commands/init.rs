//! Init command - create project-local .slipway.toml

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_NAME;
use crate::error::{SlipwayError, SlipwayResult};
use console::style;
use std::path::Path;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# Slipway project configuration
# Settings here override your global config (~/.config/slipway/config.toml)

[registry]
# endpoint = "123456789012.dkr.ecr.us-east-1.amazonaws.com"
# repository = "app"
# region = "us-east-1"

[build]
# file = "Dockerfile"
# context = "."
# platform = "linux/amd64"

[cache]
# dependency_lock = "backend/Cargo.lock"
# package_lock = "frontend/package-lock.json"

[git]
# remote = "origin"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> SlipwayResult<()> {
    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => {
            std::env::current_dir().map_err(|e| SlipwayError::io("getting current directory", e))?
        }
    };

    let config_path = target_dir.join(LOCAL_CONFIG_NAME);

    if config_path.exists() && !args.force {
        return Err(SlipwayError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| SlipwayError::io(format!("writing {}", config_path.display()), e))?;

    println!(
        "{} Created project config ({})",
        style("✓").green(),
        config_path.display()
    );

    Ok(())
}

async fn ensure_dir(dir: &Path) -> SlipwayResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| SlipwayError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_config() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        };
        execute(args).await.unwrap();

        let content = std::fs::read_to_string(temp.path().join(LOCAL_CONFIG_NAME)).unwrap();
        assert!(content.contains("[registry]"));
        assert!(content.contains("[build]"));
        assert!(content.contains("[cache]"));
    }

    #[tokio::test]
    async fn init_refuses_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_NAME), "existing").unwrap();

        let args = InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        };
        let result = execute(args).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("already exists"));
    }

    #[tokio::test]
    async fn init_overwrites_with_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_NAME), "old content").unwrap();

        let args = InitArgs {
            force: true,
            path: Some(temp.path().to_path_buf()),
        };
        execute(args).await.unwrap();

        let content = std::fs::read_to_string(temp.path().join(LOCAL_CONFIG_NAME)).unwrap();
        assert!(content.contains("[registry]"));
    }

    #[test]
    fn template_is_valid_toml() {
        // The template has commented-out lines; uncommented lines must parse
        let _: toml::Value = toml::from_str(INIT_TEMPLATE).unwrap();
    }
}
