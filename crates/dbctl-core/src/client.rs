//! Database administration operations
//!
//! Each public method on [`DatabaseAdminClient`] maps to one CLI command and
//! returns the process status code. Failures are logged once, with an
//! operation label, at the point they are turned into [`FAILURE`].

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, info};

use crate::api::{
    CreateDatabaseRequest, DatabaseApi, DatabaseInstanceRecord, LinkDatabaseRequest,
    RequestContext, ResetCredentialsRequest, RestoreDatabaseRequest,
};
use crate::console::Console;
use crate::credentials::CredentialProvider;
use crate::error::{CoreError, Result, describe_failure};
use crate::local_config::LocalConfigStore;
use crate::password::validate_password;
use crate::progress::{PollPolicy, ProgressCallback, wait_until_ready};

/// Status code for a successful operation
pub const SUCCESS: i32 = 0;
/// Status code for any failed operation
pub const FAILURE: i32 = 1;

/// Client for the database endpoints of the control plane
pub struct DatabaseAdminClient {
    api: Arc<dyn DatabaseApi>,
    credentials: Arc<dyn CredentialProvider>,
    console: Console,
    poll_policy: PollPolicy,
    progress: Option<ProgressCallback>,
    local_config: LocalConfigStore,
}

impl DatabaseAdminClient {
    pub fn new(api: Arc<dyn DatabaseApi>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            api,
            credentials,
            console: Console::default(),
            poll_policy: PollPolicy::default(),
            progress: None,
            local_config: LocalConfigStore::default(),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Local config file rewritten by [`connect_local_config`](Self::connect_local_config)
    pub fn with_local_config(mut self, store: LocalConfigStore) -> Self {
        self.local_config = store;
        self
    }

    /// Provision a managed instance, optionally waiting until it is usable
    pub async fn create_database(
        &self,
        host: &str,
        name: &str,
        admin_user: &str,
        admin_password: &str,
        wait: bool,
    ) -> i32 {
        let label = format!("Failed to create database {}", name);
        let result: Result<()> = async {
            validate_password(admin_password)?;
            let ctx = self.context(host).await?;
            let request = CreateDatabaseRequest {
                name: name.to_string(),
                admin_name: admin_user.to_string(),
                admin_password: admin_password.to_string(),
            };
            self.api.create_database(&ctx, &request).await?;
            info!("Requested creation of database {}", name);
            self.console
                .line(format!("Database {} creation requested", name))?;

            if wait {
                self.await_ready(&ctx, name).await?;
            }
            Ok(())
        }
        .await;
        self.finish(&label, result)
    }

    /// Register an externally hosted Postgres instance
    pub async fn link_existing_database(
        &self,
        host: &str,
        name: &str,
        hostname: &str,
        port: u16,
        password: &str,
        enable_provenance: bool,
    ) -> i32 {
        let label = format!("Failed to link database {}", name);
        let result: Result<()> = async {
            validate_password(password)?;
            let ctx = self.context(host).await?;
            let request = LinkDatabaseRequest {
                name: name.to_string(),
                host_name: hostname.to_string(),
                port,
                password: password.to_string(),
                capture_provenance: enable_provenance,
            };
            self.api.link_database(&ctx, &request).await?;
            self.console.line(format!("Database {} linked", name))
        }
        .await;
        self.finish(&label, result)
    }

    pub async fn delete_database(&self, host: &str, name: &str) -> i32 {
        let label = format!("Failed to delete database {}", name);
        let result: Result<()> = async {
            let ctx = self.context(host).await?;
            self.api.delete_database(&ctx, name).await?;
            self.console.line(format!("Database {} deleted", name))
        }
        .await;
        self.finish(&label, result)
    }

    pub async fn unlink_database(&self, host: &str, name: &str) -> i32 {
        let label = format!("Failed to unlink database {}", name);
        let result: Result<()> = async {
            let ctx = self.context(host).await?;
            self.api.unlink_database(&ctx, name).await?;
            self.console.line(format!("Database {} unlinked", name))
        }
        .await;
        self.finish(&label, result)
    }

    /// Fetch one instance. Errors are returned to the caller unlogged.
    pub async fn get_instance_info(&self, host: &str, name: &str) -> Result<DatabaseInstanceRecord> {
        let ctx = self.context(host).await?;
        self.api.get_instance(&ctx, name).await
    }

    pub async fn get_database(&self, host: &str, name: &str, as_json: bool) -> i32 {
        let label = format!("Failed to get database {}", name);
        let result: Result<()> = async {
            let record = self.get_instance_info(host, name).await?;
            if as_json {
                self.console.json(&record)
            } else {
                self.print_record(&record)
            }
        }
        .await;
        self.finish(&label, result)
    }

    pub async fn list_databases(&self, host: &str, as_json: bool) -> i32 {
        let result: Result<()> = async {
            let ctx = self.context(host).await?;
            let records = self.api.list_instances(&ctx).await?;
            debug!("Listed {} instances", records.len());

            if as_json {
                return self.console.json(&records);
            }
            if records.is_empty() {
                info!("No Postgres database instances found");
                return self.console.line("No Postgres database instances found");
            }
            for record in &records {
                self.print_record(record)?;
            }
            Ok(())
        }
        .await;
        self.finish("Failed to list databases", result)
    }

    pub async fn reset_credentials(&self, host: &str, name: &str, new_password: &str) -> i32 {
        let label = format!("Failed to reset password for database {}", name);
        let result: Result<()> = async {
            validate_password(new_password)?;
            let ctx = self.context(host).await?;
            let request = ResetCredentialsRequest {
                password: new_password.to_string(),
            };
            self.api.reset_credentials(&ctx, name, &request).await?;
            self.console
                .line(format!("Password reset for database {}", name))
        }
        .await;
        self.finish(&label, result)
    }

    /// Restore `name` as of `timestamp` into a new instance `target_name`.
    ///
    /// When waiting, the new instance is the one polled.
    pub async fn restore_database(
        &self,
        host: &str,
        name: &str,
        target_name: &str,
        timestamp: DateTime<Utc>,
        wait: bool,
    ) -> i32 {
        let label = format!("Failed to restore database {}", name);
        let result: Result<()> = async {
            let ctx = self.context(host).await?;
            let request = RestoreDatabaseRequest {
                restore_name: target_name.to_string(),
                restore_timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            self.api.restore_database(&ctx, name, &request).await?;
            info!(
                "Requested restore of {} at {} into {}",
                name, request.restore_timestamp, target_name
            );
            self.console.line(format!(
                "Restore of database {} into {} requested",
                name, target_name
            ))?;

            if wait {
                self.await_ready(&ctx, target_name).await?;
            }
            Ok(())
        }
        .await;
        self.finish(&label, result)
    }

    /// Point the local config file at instance `name`.
    ///
    /// The file is backed up before it is touched. A missing file fails
    /// before any backup or request.
    pub async fn connect_local_config(&self, host: &str, name: &str, password: &str) -> i32 {
        let label = format!("Failed to connect to database {}", name);
        let result: Result<()> = async {
            let store = &self.local_config;
            if !store.exists() {
                return Err(CoreError::LocalConfig {
                    path: store.path().display().to_string(),
                    message: format!(
                        "Config file {} not found. Run this command from your application directory",
                        store.path().display()
                    ),
                });
            }

            let backup = store.backup()?;
            info!("Backed up {} to {}", store.path().display(), backup.display());

            let record = self.get_instance_info(host, name).await?;
            let mut config = store.load()?;
            config.apply_connection(&record, password)?;
            store.save(&config)?;

            self.console.line(format!(
                "Updated {} to connect to {} ({}:{})",
                store.path().display(),
                name,
                record.host_name,
                record.port
            ))
        }
        .await;
        self.finish(&label, result)
    }

    async fn context(&self, host: &str) -> Result<RequestContext> {
        let credentials = self.credentials.credentials().await?;
        Ok(RequestContext::new(host, credentials))
    }

    async fn await_ready(&self, ctx: &RequestContext, name: &str) -> Result<()> {
        let record = wait_until_ready(
            self.api.as_ref(),
            ctx,
            name,
            &self.poll_policy,
            self.progress.as_ref(),
        )
        .await?;
        self.console
            .line(format!("Database {} is {}", name, record.status))
    }

    fn print_record(&self, record: &DatabaseInstanceRecord) -> Result<()> {
        for line in record.display_lines() {
            self.console.line(line)?;
        }
        Ok(())
    }

    fn finish(&self, label: &str, result: Result<()>) -> i32 {
        match result {
            Ok(()) => SUCCESS,
            Err(err) => {
                error!("{}", describe_failure(label, &err));
                FAILURE
            }
        }
    }
}
