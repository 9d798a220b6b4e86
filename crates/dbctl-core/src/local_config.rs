//! The application's local YAML config file
//!
//! `connect` rewrites the `database` section of this file with the connection
//! details of a cloud instance. The document is edited as a generic YAML value
//! so every key this tool does not manage survives the rewrite.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::api::DatabaseInstanceRecord;
use crate::error::{CoreError, Result};

/// File looked up in the working directory when no path is given
pub const DEFAULT_LOCAL_CONFIG: &str = "dbos-config.yaml";

/// Typed view of the `database` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseConnection {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Parsed local config document
#[derive(Debug, Clone, PartialEq)]
pub struct LocalConfig {
    document: Value,
}

impl LocalConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content).map_err(|e| CoreError::LocalConfig {
            path: String::new(),
            message: format!("Invalid YAML: {}", e),
        })?;
        let document = match document {
            Value::Null => Value::Mapping(Mapping::new()),
            Value::Mapping(_) => document,
            _ => {
                return Err(CoreError::LocalConfig {
                    path: String::new(),
                    message: "Config file must contain a YAML mapping".to_string(),
                });
            }
        };
        Ok(Self { document })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.document).map_err(|e| CoreError::LocalConfig {
            path: String::new(),
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// The `database` section, if present
    pub fn database(&self) -> Result<Option<DatabaseConnection>> {
        match self.document.get("database") {
            None | Some(Value::Null) => Ok(None),
            Some(section) => serde_yaml::from_value(section.clone())
                .map(Some)
                .map_err(|e| CoreError::LocalConfig {
                    path: String::new(),
                    message: format!("Invalid database section: {}", e),
                }),
        }
    }

    /// Point the `database` section at `record`, using `password` for login
    pub fn apply_connection(&mut self, record: &DatabaseInstanceRecord, password: &str) -> Result<()> {
        let Value::Mapping(root) = &mut self.document else {
            return Err(CoreError::LocalConfig {
                path: String::new(),
                message: "Config file must contain a YAML mapping".to_string(),
            });
        };

        let section = root
            .entry(Value::from("database"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if section.is_null() {
            *section = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(database) = section else {
            return Err(CoreError::LocalConfig {
                path: String::new(),
                message: "'database' must be a YAML mapping".to_string(),
            });
        };

        database.insert("hostname".into(), record.host_name.clone().into());
        database.insert("port".into(), u64::from(record.port).into());
        database.insert("username".into(), record.database_username.clone().into());
        database.insert("password".into(), password.into());
        Ok(())
    }
}

/// Location of the local config file plus its file operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfigStore {
    path: PathBuf,
}

impl Default for LocalConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_CONFIG)
    }
}

impl LocalConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Copy the file to `<file>.<unix-millis>.bak` next to it
    pub fn backup(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_LOCAL_CONFIG.to_string());
        let backup = self.path.with_file_name(format!(
            "{}.{}.bak",
            file_name,
            Utc::now().timestamp_millis()
        ));

        fs::copy(&self.path, &backup).map_err(|e| self.io_error("back up", e))?;
        debug!("Backed up {} to {}", self.path.display(), backup.display());
        Ok(backup)
    }

    pub fn load(&self) -> Result<LocalConfig> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error("read", e))?;
        LocalConfig::from_yaml(&content).map_err(|e| self.with_path(e))
    }

    pub fn save(&self, config: &LocalConfig) -> Result<()> {
        let content = config.to_yaml().map_err(|e| self.with_path(e))?;
        fs::write(&self.path, content).map_err(|e| self.io_error("write", e))
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> CoreError {
        CoreError::LocalConfig {
            path: self.path.display().to_string(),
            message: format!("Failed to {} {}: {}", action, self.path.display(), err),
        }
    }

    fn with_path(&self, err: CoreError) -> CoreError {
        match err {
            CoreError::LocalConfig { message, .. } => CoreError::LocalConfig {
                path: self.path.display().to_string(),
                message: format!("{}: {}", self.path.display(), message),
            },
            other => other,
        }
    }
}
