//! # dbctl-core
//!
//! Shared engine behind the `dbctl` binary: a client for the managed Postgres
//! control plane plus the configuration pieces it leans on.
//!
//! ## Layout
//!
//! - [`api`] - wire types and the [`DatabaseApi`] trait, with a reqwest-backed
//!   [`HttpDatabaseApi`]
//! - [`client`] - [`DatabaseAdminClient`], one method per CLI operation, each
//!   returning a process status code
//! - [`credentials`] - bearer token / organization resolution
//! - [`progress`] - readiness polling for create and restore
//! - [`local_config`] - the application's YAML config file that `connect`
//!   rewrites
//! - [`config`] - named profiles stored as TOML
//!
//! Collaborators (API transport, credential source, console) are passed in
//! explicitly so tests can swap in fakes:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dbctl_core::{Credentials, DatabaseAdminClient, HttpDatabaseApi, StaticCredentials};
//!
//! let client = DatabaseAdminClient::new(
//!     Arc::new(HttpDatabaseApi::new()?),
//!     Arc::new(StaticCredentials::new(Credentials::new("token", "acme"))),
//! );
//! let code = client.list_databases("cloud.dbos.dev", false).await;
//! std::process::exit(code);
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod console;
pub mod credentials;
pub mod error;
pub mod local_config;
pub mod password;
pub mod progress;

pub use api::{
    CreateDatabaseRequest, DatabaseApi, DatabaseInstanceRecord, HttpDatabaseApi, InstanceStatus,
    LinkDatabaseRequest, RequestContext, ResetCredentialsRequest, RestoreDatabaseRequest,
};
pub use client::{DatabaseAdminClient, FAILURE, SUCCESS};
pub use config::{Config, ConfigError, Profile};
pub use console::Console;
pub use credentials::{CredentialProvider, Credentials, ProfileCredentialProvider, StaticCredentials};
pub use error::{CloudApiError, CoreError, Result};
pub use local_config::{LocalConfig, LocalConfigStore};
pub use progress::{PollPolicy, ProgressCallback, ProgressEvent, wait_until_ready};
