//! Pipeline context
//!
//! Everything a stage needs is resolved once, up front, and threaded
//! explicitly through the run. Stages never communicate through ambient
//! environment state.

use crate::cache::{compute_keys, CacheDomain, DomainKey};
use crate::config::Config;
use crate::engine::ImageRef;
use crate::error::{SlipwayError, SlipwayResult};
use crate::version::{Version, VersionResolver};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// Environment variable holding the run ordinal
pub const RUN_NUMBER_VAR: &str = "SLIPWAY_RUN_NUMBER";
/// Environment variable overriding the configured region
pub const REGION_VAR: &str = "SLIPWAY_REGION";

/// Values supplied by the invoking environment, read once at startup
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub date: NaiveDate,
    pub ordinal: u32,
    pub region: String,
}

impl RunInputs {
    /// Read the run inputs from the environment
    pub fn from_env(config: &Config) -> SlipwayResult<Self> {
        let raw = std::env::var(RUN_NUMBER_VAR).map_err(|_| SlipwayError::EnvMissing {
            var: RUN_NUMBER_VAR.to_string(),
        })?;
        let ordinal: u32 = raw.trim().parse().map_err(|_| SlipwayError::EnvInvalid {
            var: RUN_NUMBER_VAR.to_string(),
            reason: format!("expected a positive integer, got {:?}", raw),
        })?;

        let region = std::env::var(REGION_VAR)
            .ok()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| config.registry.region.clone());

        Ok(Self {
            date: Utc::now().date_naive(),
            ordinal,
            region,
        })
    }
}

/// Immutable per-run context threaded through every stage
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub version: Version,
    pub region: String,
    pub endpoint: String,
    pub repository: String,
    pub platform: String,
    pub build_file: PathBuf,
    pub build_context: PathBuf,
    pub project_dir: PathBuf,
    pub keys: Vec<DomainKey>,
    pub remote: String,
    pub skip_tag: bool,
}

impl PipelineContext {
    /// Resolve the context for one run.
    ///
    /// Fails fast on a missing registry endpoint or an unreadable cache key
    /// source, before any external tool is touched.
    pub fn prepare(
        config: &Config,
        inputs: &RunInputs,
        project_dir: &Path,
        skip_tag: bool,
    ) -> SlipwayResult<Self> {
        let endpoint = config
            .registry
            .endpoint
            .clone()
            .ok_or(SlipwayError::RegistryNotConfigured)?;

        let version = VersionResolver::resolve(inputs.date, inputs.ordinal);
        let keys = compute_keys(&config.cache, project_dir)?;

        Ok(Self {
            version,
            region: inputs.region.clone(),
            endpoint,
            repository: config.registry.repository.clone(),
            platform: config.build.platform.clone(),
            build_file: project_dir.join(&config.build.file),
            build_context: project_dir.join(&config.build.context),
            project_dir: project_dir.to_path_buf(),
            keys,
            remote: config.git.remote.clone(),
            skip_tag,
        })
    }

    /// The two tags this run produces: `latest` and the version
    pub fn image_tags(&self) -> [ImageRef; 2] {
        [
            ImageRef::new(&self.endpoint, &self.repository, "latest"),
            ImageRef::new(&self.endpoint, &self.repository, self.version.as_str()),
        ]
    }

    /// The layer domain's key entry
    pub fn layer_key(&self) -> &DomainKey {
        self.keys
            .iter()
            .find(|k| k.domain == CacheDomain::Layer)
            .expect("layer domain always present in computed keys")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("backend")).unwrap();
        fs::create_dir_all(dir.path().join("frontend")).unwrap();
        fs::write(dir.path().join("backend/Cargo.lock"), "[[package]]\n").unwrap();
        fs::write(dir.path().join("frontend/package-lock.json"), "{}").unwrap();
        dir
    }

    fn inputs() -> RunInputs {
        RunInputs {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ordinal: 7,
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn prepare_requires_endpoint() {
        let dir = project();
        let config = Config::default();
        let err = PipelineContext::prepare(&config, &inputs(), dir.path(), false).unwrap_err();
        assert!(matches!(err, SlipwayError::RegistryNotConfigured));
    }

    #[test]
    fn prepare_resolves_version_and_tags() {
        let dir = project();
        let mut config = Config::default();
        config.registry.endpoint = Some("registry.example.com".to_string());

        let ctx = PipelineContext::prepare(&config, &inputs(), dir.path(), false).unwrap();
        assert_eq!(ctx.version.as_str(), "2024.05.01-7");

        let [latest, versioned] = ctx.image_tags();
        assert_eq!(latest.reference(), "registry.example.com/app:latest");
        assert_eq!(
            versioned.reference(),
            "registry.example.com/app:2024.05.01-7"
        );
    }

    #[test]
    fn prepare_fails_on_missing_lock_file() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.registry.endpoint = Some("registry.example.com".to_string());

        let err = PipelineContext::prepare(&config, &inputs(), dir.path(), false).unwrap_err();
        assert!(matches!(err, SlipwayError::CacheKeySource { .. }));
    }

    #[test]
    fn layer_key_is_present() {
        let dir = project();
        let mut config = Config::default();
        config.registry.endpoint = Some("registry.example.com".to_string());

        let ctx = PipelineContext::prepare(&config, &inputs(), dir.path(), false).unwrap();
        assert_eq!(ctx.layer_key().key.as_str(), "layer-buildx");
    }
}
