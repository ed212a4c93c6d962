//! Shared types for container engines

use std::fmt;
use std::path::PathBuf;

/// A (repository, tag-label) pair on a specific registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub endpoint: String,
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(
        endpoint: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Full reference, `endpoint/repository:tag`
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.endpoint, self.repository, self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

/// Content digest identifying an image independent of tag naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDigest(String);

impl ImageDigest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One image build: a declarative description, a single target platform,
/// both tags, and the restored caches that accelerate layer resolution
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Build description file
    pub file: PathBuf,
    /// Build context directory
    pub context: PathBuf,
    /// Target platform identifier, e.g. "linux/amd64"
    pub platform: String,
    /// The two tags the produced image carries
    pub tags: [ImageRef; 2],
    /// Restored cache entry directories fed to layer resolution
    pub cache_from: Vec<PathBuf>,
    /// Where the build writes fresh layer-cache content
    pub cache_to: Option<PathBuf>,
}
