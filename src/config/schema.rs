//! Configuration schema for Slipway
//!
//! Configuration is stored at `~/.config/slipway/config.toml`, optionally
//! overridden per project by a `.slipway.toml` file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target registry settings
    pub registry: RegistryConfig,

    /// Image build settings
    pub build: BuildConfig,

    /// Build cache settings
    pub cache: CacheConfig,

    /// Source repository settings
    pub git: GitConfig,
}

/// Target registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry endpoint, e.g. "123456789012.dkr.ecr.us-east-1.amazonaws.com"
    pub endpoint: Option<String>,

    /// Repository name within the registry
    pub repository: String,

    /// Region the registry credential is scoped to
    pub region: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            repository: "app".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

/// Image build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build description file, relative to the project directory
    pub file: String,

    /// Build context directory, relative to the project directory
    pub context: String,

    /// Target platform identifier
    pub platform: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            file: "Dockerfile".to_string(),
            context: ".".to_string(),
            platform: "linux/amd64".to_string(),
        }
    }
}

/// Build cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache store root (defaults to the state directory)
    pub dir: Option<PathBuf>,

    /// Lock file keying the compiled-dependency cache domain
    pub dependency_lock: String,

    /// Lock file keying the package-manager cache domain
    pub package_lock: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            dependency_lock: "backend/Cargo.lock".to_string(),
            package_lock: "frontend/package-lock.json".to_string(),
        }
    }
}

/// Source repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote the revision tag is pushed to
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
        }
    }
}
