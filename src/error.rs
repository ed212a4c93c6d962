//! Error types for Slipway
//!
//! All modules use `SlipwayResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Slipway operations
pub type SlipwayResult<T> = Result<T, SlipwayError>;

/// All errors that can occur in Slipway
#[derive(Error, Debug)]
pub enum SlipwayError {
    // Environment errors
    #[error("Required environment value missing: {var}")]
    EnvMissing { var: String },

    #[error("Invalid value for {var}: {reason}")]
    EnvInvalid { var: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry endpoint not configured")]
    RegistryNotConfigured,

    // Credential errors
    #[error("Registry credentials not configured: {var} is not set")]
    CredentialsMissing { var: String },

    #[error("Credential exchange failed: {0}")]
    CredentialExchange(String),

    #[error("Registry login failed: {0}")]
    RegistryLogin(String),

    // Cache errors
    #[error("Failed to read cache key source {path}: {reason}")]
    CacheKeySource { path: PathBuf, reason: String },

    #[error("Failed to persist {domain} cache: {reason}")]
    CacheSave { domain: String, reason: String },

    // Build errors
    #[error("Image build failed: {0}")]
    BuildFailed(String),

    #[error("Failed to inspect image {image}: {reason}")]
    ImageInspect { image: String, reason: String },

    #[error("Image tags diverged: latest resolves to {latest}, version tag to {versioned}")]
    DigestMismatch { latest: String, versioned: String },

    // Publish errors
    #[error("Push failed for {image}: {reason}")]
    PushFailed { image: String, reason: String },

    // Revision tag errors
    #[error("Revision tag already exists: {0}")]
    TagConflict(String),

    #[error("Failed to create revision tag {name}: {reason}")]
    TagCreate { name: String, reason: String },

    #[error("Failed to push revision tag {name}: {reason}")]
    TagPush { name: String, reason: String },

    #[error("Failed to resolve triggering commit: {0}")]
    HeadCommit(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl SlipwayError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EnvMissing { .. } => {
                Some("Set SLIPWAY_RUN_NUMBER to this invocation's run number")
            }
            Self::CredentialsMissing { .. } => {
                Some("Export AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY before running")
            }
            Self::RegistryNotConfigured => {
                Some("Set [registry] endpoint in config, or run: slipway init")
            }
            Self::TagConflict(_) => Some(
                "Each run must produce a unique version; re-trigger with a new run number, or pass --skip-tag to republish without tagging",
            ),
            _ => None,
        }
    }
}
