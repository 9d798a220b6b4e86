//! Profile configuration for dbctl
//!
//! Profiles record which control plane to talk to and the bearer token and
//! organization to use there. They live in a TOML file under the platform
//! config directory.
//!
//! # Features
//!
//! - Multiple named profiles with a default
//! - Environment variable expansion in the config file
//! - `keyring:` references resolved through the OS keyring (optional)

#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod secret;

pub use config::{Config, DEFAULT_HOST, Profile};
pub use error::{ConfigError, Result};
pub use secret::SecretStore;
