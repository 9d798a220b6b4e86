//! Error types for dbctl
//!
//! Operation failures against the control plane are logged and turned into
//! exit codes inside `dbctl-core`. The errors here cover everything around
//! them: loading profiles, prompting, parsing arguments.

use colored::Colorize;
use dbctl_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: list available profiles:
///       dbctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Render the diagnostic, one line per entry
    fn render(&self, color: bool) -> String {
        let (error, tip) = if color {
            ("error".red().bold().to_string(), "tip".yellow().bold().to_string())
        } else {
            ("error".to_string(), "tip".to_string())
        };

        let mut out = format!("{}: {}\n", error, self.message);
        if let Some(detail) = &self.detail {
            out.push_str(&format!("  {}\n", detail));
        }
        for (description, commands) in &self.tips {
            out.push_str(&format!("\n  {}: {}\n", tip, description));
            for cmd in commands {
                out.push_str(&format!("      {}\n", cmd));
            }
        }
        out
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}", self.render(true));
    }
}

/// Main error type for the dbctl application
#[derive(Error, Debug)]
pub enum DbCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'dbctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Credentials unavailable: {message}")]
    MissingCredentials { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Output error: {message}")]
    OutputError { message: String },
}

/// Result type for dbctl operations
pub type Result<T> = std::result::Result<T, DbCtlError>;

impl DbCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<(String, Vec<String>)> {
        match self {
            DbCtlError::ProfileNotFound { name } => vec![
                (
                    "list available profiles:".to_string(),
                    vec!["dbctl profile list".to_string()],
                ),
                (
                    format!("create profile '{}':", name),
                    vec![format!(
                        "dbctl profile set {} --organization <org> --token <token>",
                        name
                    )],
                ),
            ],
            DbCtlError::NoProfileConfigured => vec![
                (
                    "create a profile:".to_string(),
                    vec!["dbctl profile set prod --organization <org> --token <token>".to_string()],
                ),
                (
                    "or set credentials in the environment:".to_string(),
                    vec!["export DBCTL_TOKEN=<token> DBCTL_ORGANIZATION=<org>".to_string()],
                ),
            ],
            DbCtlError::MissingCredentials { .. } => vec![
                (
                    "store a token in the profile:".to_string(),
                    vec!["dbctl profile set <name> --organization <org> --token <token>".to_string()],
                ),
                (
                    "or set credentials in the environment:".to_string(),
                    vec!["export DBCTL_TOKEN=<token> DBCTL_ORGANIZATION=<org>".to_string()],
                ),
            ],
            DbCtlError::Configuration(_) => vec![(
                "check the configuration file:".to_string(),
                vec!["dbctl profile path".to_string()],
            )],
            DbCtlError::InvalidInput { .. } => vec![(
                "check the command syntax:".to_string(),
                vec!["dbctl <command> --help".to_string()],
            )],
            DbCtlError::ConnectionError { .. } => vec![(
                "check network connectivity and the control-plane host:".to_string(),
                vec!["dbctl profile show <profile>".to_string()],
            )],
            DbCtlError::OutputError { .. } => vec![],
        }
    }

    pub fn diagnostic(&self) -> CliDiagnostic {
        let mut diag = CliDiagnostic::error(&self.to_string());
        for (description, commands) in self.suggestions() {
            let commands: Vec<&str> = commands.iter().map(String::as_str).collect();
            diag = diag.tip(&description, &commands);
        }
        diag
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        self.diagnostic().print();
    }
}

impl From<ConfigError> for DbCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => DbCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => DbCtlError::NoProfileConfigured,
            ConfigError::CredentialError(message) => DbCtlError::MissingCredentials { message },
            #[cfg(feature = "secure-storage")]
            ConfigError::KeyringError(message) => DbCtlError::MissingCredentials { message },
            other => DbCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<CoreError> for DbCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(config_err) => DbCtlError::from(config_err),
            CoreError::Validation(message) => DbCtlError::InvalidInput { message },
            CoreError::Transport(message) => DbCtlError::ConnectionError { message },
            CoreError::Credentials(message) => DbCtlError::MissingCredentials { message },
            other => DbCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<std::io::Error> for DbCtlError {
    fn from(err: std::io::Error) -> Self {
        DbCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for DbCtlError {
    fn from(err: anyhow::Error) -> Self {
        DbCtlError::Configuration(format!("{:#}", err))
    }
}
