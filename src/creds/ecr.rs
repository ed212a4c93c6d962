//! ECR credential exchange using the AWS CLI
//!
//! `aws ecr get-login-password` trades the account key pair for a registry
//! login password valid for twelve hours. The key pair is handed to the
//! child process environment only; the resulting token never touches disk.

use crate::creds::{AccountKeys, CredentialExchange, RegistryCredential};
use crate::error::{SlipwayError, SlipwayResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Registry login passwords issued by ECR are valid for 12 hours
const TOKEN_VALIDITY_HOURS: i64 = 12;

/// ECR username is fixed for password-based login
const ECR_USERNAME: &str = "AWS";

/// Credential exchange against the Elastic Container Registry
pub struct EcrExchange;

impl EcrExchange {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EcrExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialExchange for EcrExchange {
    async fn exchange(
        &self,
        keys: &AccountKeys,
        region: &str,
        endpoint: &str,
    ) -> SlipwayResult<RegistryCredential> {
        debug!("Requesting registry login password for region {}", region);

        let mut cmd = Command::new("aws");
        cmd.args(["ecr", "get-login-password"]);
        cmd.args(["--region", region]);
        cmd.env("AWS_ACCESS_KEY_ID", &keys.access_key_id);
        cmd.env("AWS_SECRET_ACCESS_KEY", &keys.secret_access_key);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd
            .output()
            .await
            .map_err(|e| SlipwayError::command_failed("aws ecr get-login-password", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipwayError::CredentialExchange(stderr.trim().to_string()));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(SlipwayError::CredentialExchange(
                "empty login password returned".to_string(),
            ));
        }

        let expires_at = Utc::now() + Duration::hours(TOKEN_VALIDITY_HOURS);
        debug!("Registry credential issued, valid until {}", expires_at);

        Ok(RegistryCredential::new(
            ECR_USERNAME,
            token,
            endpoint,
            expires_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_carries_fixed_username_and_endpoint() {
        let cred = RegistryCredential::new(
            ECR_USERNAME,
            "token",
            "123456789012.dkr.ecr.us-east-1.amazonaws.com",
            Utc::now() + Duration::hours(TOKEN_VALIDITY_HOURS),
        );
        assert_eq!(cred.username, "AWS");
        assert!(cred.endpoint.contains("dkr.ecr"));
        assert!(cred.expires_at > Utc::now());
    }
}
