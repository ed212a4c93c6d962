//! Docker container engine
//!
//! Implements the ContainerEngine trait by driving the Docker CLI. The
//! build runs through buildx so local cache import/export is available;
//! both tags are applied by the same invocation, after the digest is
//! finalized.

use crate::creds::RegistryCredential;
use crate::engine::types::{BuildRequest, ImageDigest, ImageRef};
use crate::engine::{build_error_tail, ContainerEngine};
use crate::error::{SlipwayError, SlipwayResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Container engine using the Docker CLI
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Self {
        Self
    }

    /// Execute a Docker command and return the output
    async fn exec(&self, args: &[&str]) -> SlipwayResult<std::process::Output> {
        debug!("Executing: docker {:?}", args);

        Command::new("docker")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SlipwayError::command_failed(format!("docker {:?}", args), e))
    }

    /// Assemble the buildx argument list for a build request
    fn build_args(request: &BuildRequest, iidfile: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            "buildx".to_string(),
            "build".to_string(),
            "--file".to_string(),
            request.file.display().to_string(),
            "--platform".to_string(),
            request.platform.clone(),
        ];

        for tag in &request.tags {
            args.push("--tag".to_string());
            args.push(tag.reference());
        }

        for src in &request.cache_from {
            args.push("--cache-from".to_string());
            args.push(format!("type=local,src={}", src.display()));
        }

        if let Some(dest) = &request.cache_to {
            args.push("--cache-to".to_string());
            args.push(format!("type=local,dest={},mode=max", dest.display()));
        }

        args.push("--iidfile".to_string());
        args.push(iidfile.display().to_string());
        args.push("--load".to_string());
        args.push(request.context.display().to_string());
        args
    }
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn is_available(&self) -> bool {
        Command::new("docker")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn build(&self, request: &BuildRequest) -> SlipwayResult<ImageDigest> {
        let iidfile =
            std::env::temp_dir().join(format!("slipway-iid-{}", std::process::id()));

        let args = Self::build_args(request, &iidfile);
        let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        info!("Building image for {}", request.platform);
        let output = self.exec(&args_refs).await?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::BuildFailed(build_error_tail(
                &stdout, &stderr,
            )));
        }

        let id = std::fs::read_to_string(&iidfile)
            .map_err(|e| SlipwayError::io(format!("reading {}", iidfile.display()), e))?;
        let _ = std::fs::remove_file(&iidfile);

        let digest = ImageDigest::new(id.trim().to_string());
        info!("Built image {}", digest);
        Ok(digest)
    }

    async fn login(&self, credential: &RegistryCredential) -> SlipwayResult<()> {
        debug!("Logging in to {}", credential.endpoint);

        // Token goes through stdin, never through argv
        let mut child = Command::new("docker")
            .args([
                "login",
                "--username",
                &credential.username,
                "--password-stdin",
                &credential.endpoint,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SlipwayError::command_failed("docker login", e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(credential.token().as_bytes())
                .await
                .map_err(|e| SlipwayError::io("writing login password", e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SlipwayError::command_failed("docker login", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::RegistryLogin(stderr.trim().to_string()));
        }

        info!("Authenticated to {}", credential.endpoint);
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> SlipwayResult<()> {
        let reference = image.reference();
        info!("Pushing {}", reference);

        let output = self.exec(&["push", &reference]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::PushFailed {
                image: reference,
                reason: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    async fn resolve_digest(&self, image: &ImageRef) -> SlipwayResult<ImageDigest> {
        let reference = image.reference();
        let output = self
            .exec(&["image", "inspect", "--format", "{{.Id}}", &reference])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::ImageInspect {
                image: reference,
                reason: stderr.trim().to_string(),
            });
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ImageDigest::new(id))
    }

    fn engine_name(&self) -> &'static str {
        "Docker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> BuildRequest {
        BuildRequest {
            file: PathBuf::from("Dockerfile"),
            context: PathBuf::from("."),
            platform: "linux/amd64".to_string(),
            tags: [
                ImageRef::new("registry.example.com", "app", "latest"),
                ImageRef::new("registry.example.com", "app", "2024.05.01-7"),
            ],
            cache_from: vec![PathBuf::from("/cache/deps-abc"), PathBuf::from("/cache/layer-buildx")],
            cache_to: Some(PathBuf::from("/cache/.staging")),
        }
    }

    #[test]
    fn build_args_carry_both_tags() {
        let args = DockerEngine::build_args(&request(), &PathBuf::from("/tmp/iid"));
        let tags: Vec<&String> = args
            .iter()
            .zip(args.iter().skip(1))
            .filter(|(flag, _)| *flag == "--tag")
            .map(|(_, value)| value)
            .collect();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], "registry.example.com/app:latest");
        assert_eq!(tags[1], "registry.example.com/app:2024.05.01-7");
    }

    #[test]
    fn build_args_map_caches_to_local_type() {
        let args = DockerEngine::build_args(&request(), &PathBuf::from("/tmp/iid"));
        let joined = args.join(" ");

        assert!(joined.contains("--cache-from type=local,src=/cache/deps-abc"));
        assert!(joined.contains("--cache-from type=local,src=/cache/layer-buildx"));
        assert!(joined.contains("--cache-to type=local,dest=/cache/.staging,mode=max"));
    }

    #[test]
    fn build_args_without_caches_omit_cache_flags() {
        let mut req = request();
        req.cache_from.clear();
        req.cache_to = None;

        let args = DockerEngine::build_args(&req, &PathBuf::from("/tmp/iid"));
        assert!(!args.iter().any(|a| a == "--cache-from"));
        assert!(!args.iter().any(|a| a == "--cache-to"));
    }

    #[test]
    fn build_args_end_with_context() {
        let args = DockerEngine::build_args(&request(), &PathBuf::from("/tmp/iid"));
        assert_eq!(args.last().unwrap(), ".");
        assert_eq!(args[0], "buildx");
    }
}
