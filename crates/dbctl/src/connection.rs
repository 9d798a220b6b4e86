//! Connection management for the control-plane client

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dbctl_core::config::DEFAULT_HOST;
use dbctl_core::{
    Config, CredentialProvider, DatabaseAdminClient, HttpDatabaseApi, ProfileCredentialProvider,
};
use tracing::{debug, trace};

use crate::error::Result as CliResult;

/// Resolves hosts and builds authenticated admin clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub profile: Option<String>,
    pub host_override: Option<String>,
}

impl ConnectionManager {
    /// Create a new connection manager with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_path: None,
            profile: None,
            host_override: None,
        }
    }

    /// Use an explicit config file; environment credentials are then ignored
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host_override = host;
        self
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Path of the profile config in use
    pub fn config_file(&self) -> CliResult<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// Control-plane host: `--host`/`DBCTL_HOST`, then the profile, then the default
    pub fn resolve_host(&self) -> String {
        if let Some(host) = &self.host_override {
            debug!("Using host from command line: {}", host);
            return host.clone();
        }
        match self.config.profile(self.profile.as_deref()) {
            Ok((name, profile)) => {
                debug!("Using host {} from profile {}", profile.host, name);
                profile.host.clone()
            }
            Err(e) => {
                trace!("No profile host ({}), using default", e);
                DEFAULT_HOST.to_string()
            }
        }
    }

    fn credential_provider(&self) -> ProfileCredentialProvider {
        ProfileCredentialProvider::new(self.config_path.clone(), self.profile.clone())
    }

    /// Fail early, with a diagnostic, when no token/organization can be resolved
    pub async fn check_credentials(&self) -> CliResult<()> {
        let credentials = self.credential_provider().credentials().await?;
        debug!("Credentials resolved for organization {}", credentials.organization);
        Ok(())
    }

    /// Build an admin client that resolves credentials on every operation
    pub fn admin_client(&self) -> CliResult<DatabaseAdminClient> {
        let api = HttpDatabaseApi::new()?;
        Ok(DatabaseAdminClient::new(
            Arc::new(api),
            Arc::new(self.credential_provider()),
        ))
    }
}
