//! Unified error handling for dbctl-core
//!
//! Every failure an operation can hit funnels into [`CoreError`]. HTTP
//! failures are split by [`classify_response`] into the structured
//! control-plane shape ([`CoreError::Api`]) and everything else
//! ([`CoreError::Http`]).
//!
//! # Example
//!
//! ```rust
//! use dbctl_core::error::{classify_response, describe_failure};
//!
//! let body = r#"{"message":"instance not found","statusCode":404,"requestID":"req-1"}"#;
//! let err = classify_response(404, body);
//! assert!(err.is_not_found());
//! assert_eq!(
//!     describe_failure("Failed to get database orders", &err),
//!     "[req-1] Failed to get database orders: instance not found"
//! );
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Error body returned by the control plane on a rejected request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudApiError {
    pub message: String,
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl CloudApiError {
    /// Parse a response body, returning `None` unless it has the structured
    /// shape: a string `message` plus a `statusCode` or a non-null `code`.
    pub fn parse(body: &str) -> Option<Self> {
        let err: CloudApiError = serde_json::from_str(body).ok()?;
        let has_code = matches!(err.code, Some(Value::String(_)) | Some(Value::Number(_)));
        if err.status_code.is_some() || has_code {
            Some(err)
        } else {
            None
        }
    }
}

/// Core error type for control-plane operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Structured error returned by the control plane
    #[error("Cloud API error ({status}): {}", .error.message)]
    Api { status: u16, error: CloudApiError },

    /// Non-success response without a structured body
    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Network, TLS, or timeout failure before a response arrived
    #[error("Connection error: {0}")]
    Transport(String),

    /// Response arrived but could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Token or organization could not be resolved
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Problem with the application's local config file
    #[error("{message}")]
    LocalConfig { path: String, message: String },

    /// Readiness polling exceeded its deadline
    #[error("Timed out after {0:?} waiting for the database to become available")]
    Timeout(Duration),

    /// Profile configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// HTTP status of the failed request, if one was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } | CoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Timeout(_) => true,
            CoreError::Transport(msg) => msg.to_lowercase().contains("timed out"),
            _ => false,
        }
    }

    /// Returns true if the failure happened client-side before any request
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// Returns true if repeating the request might succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Transport(_) | CoreError::Timeout(_) => true,
            _ => self.is_server_error() || self.status() == Some(429),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Transport(err.to_string())
    }
}

/// Turn a non-success response into the matching error variant
pub fn classify_response(status: u16, body: &str) -> CoreError {
    match CloudApiError::parse(body) {
        Some(error) => CoreError::Api { status, error },
        None => {
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            };
            CoreError::Http { status, message }
        }
    }
}

/// Render the line logged when an operation fails.
///
/// Structured errors print the decoded message (prefixed with the request id
/// when present); anything else prints the raw error text. Validation and
/// local-config errors carry their own wording and are not labelled.
pub fn describe_failure(label: &str, err: &CoreError) -> String {
    match err {
        CoreError::Api { error, .. } => match &error.request_id {
            Some(id) => format!("[{}] {}: {}", id, label, error.message),
            None => format!("{}: {}", label, error.message),
        },
        CoreError::Validation(msg) => msg.clone(),
        CoreError::LocalConfig { message, .. } => message.clone(),
        other => format!("{}: {}", label, other),
    }
}
