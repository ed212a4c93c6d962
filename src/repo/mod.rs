//! Source repository access
//!
//! The pipeline records a release by tagging the commit that triggered the
//! run. Tag creation is never an overwrite: an existing tag with the same
//! name is a hard conflict.

mod git;

pub use git::GitRepo;

use crate::error::SlipwayResult;
use async_trait::async_trait;

/// Revision tag operations against the canonical source repository
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Resolve the commit that triggered this run
    async fn head_commit(&self) -> SlipwayResult<String>;

    /// Check whether a tag with this name already exists, locally or on the remote
    async fn tag_exists(&self, name: &str) -> SlipwayResult<bool>;

    /// Create a tag pointing at a commit
    async fn create_tag(&self, name: &str, commit: &str) -> SlipwayResult<()>;

    /// Publish a tag to the canonical remote
    async fn push_tag(&self, name: &str) -> SlipwayResult<()>;
}
