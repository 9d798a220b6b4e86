//! Profile configuration for dbctl
//!
//! Handles loading profiles from the TOML config file. Each profile names a
//! control-plane host plus the organization and bearer token used there.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::secret::SecretStore;
use crate::credentials::Credentials;

/// Control-plane host used when neither a flag nor a profile names one
pub const DEFAULT_HOST: &str = "cloud.dbos.dev";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when `--profile` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Control-plane host (no scheme means https)
    #[serde(default = "default_host")]
    pub host: String,
    /// Organization that owns the database instances
    pub organization: String,
    /// Bearer token, plaintext or a `keyring:` reference
    pub token: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl Profile {
    pub fn new(host: impl Into<String>, organization: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            organization: organization.into(),
            token: token.into(),
        }
    }

    /// Resolve the stored token (following keyring references) into credentials
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        let store = SecretStore::new();
        let token = store
            .resolve(&self.token)
            .map_err(|e| ConfigError::CredentialError(format!("Failed to resolve token: {}", e)))?;
        let organization = store.resolve(&self.organization).map_err(|e| {
            ConfigError::CredentialError(format!("Failed to resolve organization: {}", e))
        })?;
        Ok(Credentials::new(token, organization))
    }

    /// True when the token lives in the OS keyring
    pub fn uses_keyring(&self) -> bool {
        SecretStore::is_keyring_reference(&self.token)
    }
}

impl Config {
    /// Resolve the profile to use
    ///
    /// Order: explicit name, `default_profile`, then the alphabetically first
    /// profile.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some((name, _)) = self.list_profiles().first() {
            return Ok((*name).clone());
        }

        Err(ConfigError::NoProfiles {
            suggestion: "Use 'dbctl profile set' to create a profile.".to_string(),
        })
    }

    /// Look up a profile, resolving the name first
    pub fn profile(&self, explicit_profile: Option<&str>) -> Result<(String, &Profile)> {
        let name = self.resolve_profile(explicit_profile)?;
        let profile = self
            .profiles
            .get(&name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.clone() })?;
        Ok((name, profile))
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/dbctl/config.toml` is preferred when it (or its
    /// directory) exists, falling back to
    /// `~/Library/Application Support/dev.dbctl.dbctl/config.toml`.
    ///
    /// On Linux: ~/.config/dbctl/config.toml
    /// On Windows: %APPDATA%\dbctl\dbctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("dbctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("dev", "dbctl", "dbctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references in config content.
    ///
    /// Unset variables without a default are left as-is so profiles that are
    /// not in use never fail to load.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
