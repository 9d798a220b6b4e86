//! Bearer token and organization resolution
//!
//! Credentials are resolved fresh for every operation; nothing here caches
//! them between calls.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CoreError, Result};

/// Env var that overrides the profile token
pub const TOKEN_ENV: &str = "DBCTL_TOKEN";
/// Env var that overrides the profile organization
pub const ORGANIZATION_ENV: &str = "DBCTL_ORGANIZATION";

/// Token plus the organization the control-plane paths are scoped to
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub organization: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            organization: organization.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

/// Source of credentials for a single request
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials>;
}

/// Fixed credentials, handy for tests and for env-only setups
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}

/// Resolves credentials from the profile config on every call.
///
/// When an explicit config file is given, environment variables are ignored so
/// the file is the only source of truth.
#[derive(Debug, Clone)]
pub struct ProfileCredentialProvider {
    config_path: Option<PathBuf>,
    profile: Option<String>,
    env_overrides: bool,
}

impl ProfileCredentialProvider {
    pub fn new(config_path: Option<PathBuf>, profile: Option<String>) -> Self {
        let env_overrides = config_path.is_none();
        Self {
            config_path,
            profile,
            env_overrides,
        }
    }

    /// Force `DBCTL_TOKEN` / `DBCTL_ORGANIZATION` on or off
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    fn load_config(&self) -> Result<Config> {
        let config = match &self.config_path {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };
        Ok(config)
    }
}

#[async_trait]
impl CredentialProvider for ProfileCredentialProvider {
    async fn credentials(&self) -> Result<Credentials> {
        let (env_token, env_org) = if self.env_overrides {
            (
                std::env::var(TOKEN_ENV).ok(),
                std::env::var(ORGANIZATION_ENV).ok(),
            )
        } else {
            debug!("Environment overrides disabled for explicit config file");
            (None, None)
        };

        if let (Some(token), Some(organization)) = (&env_token, &env_org) {
            info!("Using credentials from environment variables");
            return Ok(Credentials::new(token.clone(), organization.clone()));
        }

        let config = self.load_config()?;
        let (name, profile) = config.profile(self.profile.as_deref())?;
        info!("Using profile: {}", name);

        let resolved = profile.resolve_credentials()?;
        if env_token.is_some() || env_org.is_some() {
            debug!("Applied partial environment variable overrides");
        }

        let credentials = Credentials::new(
            env_token.unwrap_or(resolved.token),
            env_org.unwrap_or(resolved.organization),
        );

        if credentials.token.is_empty() {
            return Err(CoreError::Credentials(format!(
                "Profile '{}' has an empty token",
                name
            )));
        }
        Ok(credentials)
    }
}
