//! Cache domains and content-addressed key derivation
//!
//! Dependency and package domains are keyed by hashing the configured lock
//! file's bytes, so any byte change invalidates the domain. The layer domain
//! uses a fixed engine-specific key shared across runs.

use crate::config::schema::CacheConfig;
use crate::error::{SlipwayError, SlipwayResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed key suffix for the layer domain
const LAYER_KEY: &str = "buildx";

/// The three independent cache domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    /// Compiled-dependency cache, keyed on the backend lock file
    Dependency,
    /// Package-manager cache, keyed on the frontend lock file
    Package,
    /// Build-layer cache, fixed key shared across runs
    Layer,
}

impl CacheDomain {
    /// All domains, in restore order
    pub fn all() -> &'static [Self] {
        &[Self::Dependency, Self::Package, Self::Layer]
    }

    /// Directory name for this domain under the store root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Dependency => "deps",
            Self::Package => "pkg",
            Self::Layer => "layer",
        }
    }

    /// What the domain's key is derived from
    pub fn key_source(&self, config: &CacheConfig, project_dir: &Path) -> KeySource {
        match self {
            Self::Dependency => KeySource::File(project_dir.join(&config.dependency_lock)),
            Self::Package => KeySource::File(project_dir.join(&config.package_lock)),
            Self::Layer => KeySource::Constant(LAYER_KEY),
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dependency => "dependency",
            Self::Package => "package",
            Self::Layer => "layer",
        };
        write!(f, "{}", name)
    }
}

/// Input a cache key is derived from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Hash the full byte content of this file
    File(PathBuf),
    /// Use this value verbatim
    Constant(&'static str),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Constant(value) => write!(f, "(fixed: {})", value),
        }
    }
}

/// A computed cache key, `<domain-dir>-<suffix>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A domain paired with its computed key
#[derive(Debug, Clone)]
pub struct DomainKey {
    pub domain: CacheDomain,
    pub key: CacheKey,
    pub source: KeySource,
}

/// Hash a file's contents using SHA256, returning first 12 hex chars
fn hash_file_contents(path: &Path) -> SlipwayResult<String> {
    let contents = fs::read(path).map_err(|e| SlipwayError::CacheKeySource {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let result = hasher.finalize();

    // Take first 12 hex characters (6 bytes)
    Ok(hex::encode(&result[..6]))
}

/// Compute the key for one domain.
///
/// A missing or unreadable lock file is a configuration error, not a miss.
pub fn compute_key(domain: CacheDomain, source: &KeySource) -> SlipwayResult<CacheKey> {
    let suffix = match source {
        KeySource::File(path) => hash_file_contents(path)?,
        KeySource::Constant(value) => (*value).to_string(),
    };
    let key = CacheKey(format!("{}-{}", domain.dir_name(), suffix));
    debug!("Computed {} cache key: {}", domain, key);
    Ok(key)
}

/// Compute keys for all domains of a project
pub fn compute_keys(config: &CacheConfig, project_dir: &Path) -> SlipwayResult<Vec<DomainKey>> {
    CacheDomain::all()
        .iter()
        .map(|&domain| {
            let source = domain.key_source(config, project_dir);
            let key = compute_key(domain, &source)?;
            Ok(DomainKey {
                domain,
                key,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_locks() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("backend")).unwrap();
        fs::create_dir_all(dir.path().join("frontend")).unwrap();
        fs::write(dir.path().join("backend/Cargo.lock"), "[[package]]\n").unwrap();
        fs::write(dir.path().join("frontend/package-lock.json"), "{}").unwrap();
        dir
    }

    #[test]
    fn domain_display() {
        assert_eq!(CacheDomain::Dependency.to_string(), "dependency");
        assert_eq!(CacheDomain::Layer.to_string(), "layer");
    }

    #[test]
    fn layer_key_is_constant() {
        let config = CacheConfig::default();
        let dir = TempDir::new().unwrap();
        let source = CacheDomain::Layer.key_source(&config, dir.path());
        let key = compute_key(CacheDomain::Layer, &source).unwrap();
        assert_eq!(key.as_str(), "layer-buildx");
    }

    #[test]
    fn key_is_stable_for_unchanged_content() {
        let dir = project_with_locks();
        let config = CacheConfig::default();
        let source = CacheDomain::Dependency.key_source(&config, dir.path());

        let first = compute_key(CacheDomain::Dependency, &source).unwrap();
        let second = compute_key(CacheDomain::Dependency, &source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn one_changed_byte_changes_key() {
        let dir = project_with_locks();
        let config = CacheConfig::default();
        let source = CacheDomain::Dependency.key_source(&config, dir.path());

        let before = compute_key(CacheDomain::Dependency, &source).unwrap();
        fs::write(dir.path().join("backend/Cargo.lock"), "[[package]]!").unwrap();
        let after = compute_key(CacheDomain::Dependency, &source).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn missing_lock_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::default();
        let source = CacheDomain::Dependency.key_source(&config, dir.path());

        let err = compute_key(CacheDomain::Dependency, &source).unwrap_err();
        assert!(matches!(err, SlipwayError::CacheKeySource { .. }));
    }

    #[test]
    fn compute_keys_covers_all_domains() {
        let dir = project_with_locks();
        let config = CacheConfig::default();

        let keys = compute_keys(&config, dir.path()).unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys[0].key.as_str().starts_with("deps-"));
        assert!(keys[1].key.as_str().starts_with("pkg-"));
        assert_eq!(keys[2].key.as_str(), "layer-buildx");
    }

    #[test]
    fn hash_suffix_is_twelve_chars() {
        let dir = project_with_locks();
        let hash = hash_file_contents(&dir.path().join("backend/Cargo.lock")).unwrap();
        assert_eq!(hash.len(), 12);
    }
}
