//! Container engine abstraction
//!
//! The image build, registry login, and push all go through one engine
//! trait; the production implementation drives the Docker CLI.

mod docker;
pub mod types;

pub use docker::DockerEngine;
pub use types::{BuildRequest, ImageDigest, ImageRef};

use crate::creds::RegistryCredential;
use crate::error::SlipwayResult;
use async_trait::async_trait;

/// Abstract container engine interface
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Check if the engine is available on this system
    async fn is_available(&self) -> bool;

    /// Build one image carrying both requested tags, returning its digest
    async fn build(&self, request: &BuildRequest) -> SlipwayResult<ImageDigest>;

    /// Authenticate to the credential's registry endpoint
    async fn login(&self, credential: &RegistryCredential) -> SlipwayResult<()>;

    /// Upload one tag to the remote registry
    async fn push(&self, image: &ImageRef) -> SlipwayResult<()>;

    /// Resolve the digest a local tag currently points at
    async fn resolve_digest(&self, image: &ImageRef) -> SlipwayResult<ImageDigest>;

    /// Human-readable engine name for display
    fn engine_name(&self) -> &'static str;
}

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}
