//! Configuration management for Slipway

pub mod schema;

pub use schema::Config;

use crate::error::{SlipwayError, SlipwayResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Project-local config file name, discovered upward from the working directory
pub const LOCAL_CONFIG_NAME: &str = ".slipway.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slipway")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slipway")
    }

    /// Get the cache store root
    pub fn cache_dir() -> PathBuf {
        Self::state_dir().join("cache")
    }

    /// Find a project-local config by walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(LOCAL_CONFIG_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = d.parent();
        }
        None
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> SlipwayResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load the global config, then overlay a project-local file if given
    pub async fn load_merged(&self, local: Option<&Path>) -> SlipwayResult<Config> {
        let global = if self.config_path.exists() {
            Self::read_value(&self.config_path).await?
        } else {
            toml::Value::Table(Default::default())
        };

        let merged = match local {
            Some(path) => {
                debug!("Merging local config from {}", path.display());
                let overlay = Self::read_value(path).await?;
                merge_values(global, overlay)
            }
            None => global,
        };

        merged.try_into().map_err(|e: toml::de::Error| {
            SlipwayError::ConfigInvalid {
                path: local.unwrap_or(&self.config_path).to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SlipwayResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SlipwayError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SlipwayError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SlipwayResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SlipwayError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        Ok(())
    }

    async fn read_value(path: &Path) -> SlipwayResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SlipwayError::io(format!("reading config from {}", path.display()), e))?;

        content.parse().map_err(|e: toml::de::Error| {
            SlipwayError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SlipwayResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SlipwayError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge two TOML values, with `overlay` winning on conflicts
fn merge_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            toml::Value::Table(base)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.registry.repository, "app");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.registry.repository = "windmill".to_string();
        manager.save(&config).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.registry.repository, "windmill");
    }

    #[tokio::test]
    async fn local_config_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        let local = temp.path().join(LOCAL_CONFIG_NAME);

        std::fs::write(
            &global,
            "[registry]\nendpoint = \"global.example.com\"\nrepository = \"app\"\n",
        )
        .unwrap();
        std::fs::write(&local, "[registry]\nendpoint = \"local.example.com\"\n").unwrap();

        let manager = ConfigManager::with_path(global);
        let config = manager.load_merged(Some(&local)).await.unwrap();

        // Local wins where set, global survives where not
        assert_eq!(config.registry.endpoint.as_deref(), Some("local.example.com"));
        assert_eq!(config.registry.repository, "app");
    }

    #[tokio::test]
    async fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "registry = 1").unwrap();

        let manager = ConfigManager::with_path(path.clone());
        let err = manager.load().await.unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn find_local_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_NAME), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(LOCAL_CONFIG_NAME));
    }

    #[test]
    fn find_local_config_absent() {
        let temp = TempDir::new().unwrap();
        assert!(ConfigManager::find_local_config(temp.path()).is_none());
    }
}
