//! Git-backed revision store
//!
//! Drives the git CLI against the project working directory. The remote
//! existence check is best-effort: an unreachable remote downgrades to the
//! local answer rather than blocking the run.

use crate::error::{SlipwayError, SlipwayResult};
use crate::repo::RevisionStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Revision store over the git CLI
pub struct GitRepo {
    workdir: PathBuf,
    remote: String,
}

impl GitRepo {
    pub fn new(workdir: PathBuf, remote: String) -> Self {
        Self { workdir, remote }
    }

    /// Execute a git command in the working directory
    async fn exec(&self, args: &[&str]) -> SlipwayResult<std::process::Output> {
        debug!("Executing: git {:?}", args);

        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SlipwayError::command_failed(format!("git {:?}", args), e))
    }
}

#[async_trait]
impl RevisionStore for GitRepo {
    async fn head_commit(&self) -> SlipwayResult<String> {
        let output = self.exec(&["rev-parse", "HEAD"]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::HeadCommit(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn tag_exists(&self, name: &str) -> SlipwayResult<bool> {
        let local_ref = format!("refs/tags/{}", name);
        let output = self
            .exec(&["rev-parse", "-q", "--verify", &local_ref])
            .await?;
        if output.status.success() {
            return Ok(true);
        }

        // Best-effort remote check: an unreachable remote is not a conflict
        let output = self
            .exec(&["ls-remote", "--tags", &self.remote, &local_ref])
            .await?;
        if !output.status.success() {
            debug!("Remote tag lookup unavailable, using local answer");
            return Ok(false);
        }

        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    async fn create_tag(&self, name: &str, commit: &str) -> SlipwayResult<()> {
        let output = self.exec(&["tag", name, commit]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("already exists") {
                return Err(SlipwayError::TagConflict(name.to_string()));
            }
            return Err(SlipwayError::TagCreate {
                name: name.to_string(),
                reason: stderr.trim().to_string(),
            });
        }

        debug!("Created tag {} at {}", name, commit);
        Ok(())
    }

    async fn push_tag(&self, name: &str) -> SlipwayResult<()> {
        let tag_ref = format!("refs/tags/{}", name);
        let output = self.exec(&["push", &self.remote, &tag_ref]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::TagPush {
                name: name.to_string(),
                reason: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
