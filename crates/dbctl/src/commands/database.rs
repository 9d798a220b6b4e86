//! Database command implementations

use chrono::{DateTime, Utc};
use dbctl_core::{DatabaseAdminClient, LocalConfigStore};
use tracing::{debug, info};

use super::progress;
use crate::cli::{DatabaseCommands, WaitArgs};
use crate::connection::ConnectionManager;
use crate::error::{DbCtlError, Result as CliResult};

/// Run a database command and return its exit code
pub async fn handle_database_command(
    cmd: &DatabaseCommands,
    conn_mgr: &ConnectionManager,
) -> CliResult<i32> {
    use DatabaseCommands::*;

    let host = conn_mgr.resolve_host();
    debug!("Control-plane host: {}", host);

    // Before any prompt, so a missing profile is reported as such
    conn_mgr.check_credentials().await?;

    let code = match cmd {
        Create {
            name,
            admin_user,
            password,
            wait,
        } => {
            let password = password_or_prompt(password, "Database admin password: ")?;
            let (client, spinner) = waiting_client(conn_mgr, wait)?;
            let code = client
                .create_database(&host, name, admin_user, &password, wait.wait)
                .await;
            finish_spinner(spinner);
            code
        }
        Link {
            name,
            hostname,
            port,
            password,
            enable_provenance,
        } => {
            let password = password_or_prompt(password, "Database password: ")?;
            conn_mgr
                .admin_client()?
                .link_existing_database(&host, name, hostname, *port, &password, *enable_provenance)
                .await
        }
        Delete { name } => conn_mgr.admin_client()?.delete_database(&host, name).await,
        Unlink { name } => conn_mgr.admin_client()?.unlink_database(&host, name).await,
        Get { name, json } => conn_mgr.admin_client()?.get_database(&host, name, *json).await,
        List { json } => conn_mgr.admin_client()?.list_databases(&host, *json).await,
        ResetPassword { name, password } => {
            let password = password_or_prompt(password, "New database password: ")?;
            conn_mgr
                .admin_client()?
                .reset_credentials(&host, name, &password)
                .await
        }
        Restore {
            name,
            target,
            timestamp,
            wait,
        } => {
            let timestamp = parse_timestamp(timestamp)?;
            info!("Restoring {} as of {} into {}", name, timestamp, target);
            let (client, spinner) = waiting_client(conn_mgr, wait)?;
            let code = client
                .restore_database(&host, name, target, timestamp, wait.wait)
                .await;
            finish_spinner(spinner);
            code
        }
        Connect {
            name,
            password,
            app_config,
        } => {
            let store = LocalConfigStore::new(app_config);
            // No prompt when the file is missing; the client fails before using it
            let password = if store.exists() {
                password_or_prompt(password, "Database password: ")?
            } else {
                password.clone().unwrap_or_default()
            };
            conn_mgr
                .admin_client()?
                .with_local_config(store)
                .connect_local_config(&host, name, &password)
                .await
        }
    };
    Ok(code)
}

/// Client configured for `--wait`, with a spinner when waiting
fn waiting_client(
    conn_mgr: &ConnectionManager,
    wait: &WaitArgs,
) -> CliResult<(DatabaseAdminClient, Option<indicatif::ProgressBar>)> {
    let client = conn_mgr
        .admin_client()?
        .with_poll_policy(progress::poll_policy(wait));
    if !wait.wait {
        return Ok((client, None));
    }
    let (pb, callback) = progress::spinner();
    Ok((client.with_progress(callback), Some(pb)))
}

fn finish_spinner(spinner: Option<indicatif::ProgressBar>) {
    if let Some(pb) = spinner
        && !pb.is_finished()
    {
        pb.finish_and_clear();
    }
}

/// Use the password from the command line or prompt for it without echo
fn password_or_prompt(password: &Option<String>, prompt: &str) -> CliResult<String> {
    match password {
        Some(p) => Ok(p.clone()),
        None => rpassword::prompt_password(prompt).map_err(|e| DbCtlError::InvalidInput {
            message: format!("Failed to read password: {}", e),
        }),
    }
}

/// Parse an RFC 3339 timestamp into UTC.
///
/// Restore points are sent with millisecond precision, so finer input is
/// rejected rather than truncated.
pub fn parse_timestamp(value: &str) -> CliResult<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbCtlError::InvalidInput {
            message: format!(
                "Invalid timestamp '{}': {} (expected RFC 3339, e.g. 2024-03-15T08:00:00Z)",
                value, e
            ),
        })?;
    if ts.timestamp_subsec_nanos() % 1_000_000 != 0 {
        return Err(DbCtlError::InvalidInput {
            message: format!(
                "Invalid timestamp '{}': precision finer than milliseconds is not supported",
                value
            ),
        });
    }
    Ok(ts)
}
