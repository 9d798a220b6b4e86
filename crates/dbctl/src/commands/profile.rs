//! Profile management command implementations

use colored::Colorize;
use dbctl_core::Profile;
use dbctl_core::config::SecretStore;
use tracing::{debug, info, trace};

use crate::cli::ProfileCommands;
use crate::connection::ConnectionManager;
use crate::error::{DbCtlError, Result as CliResult};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List { json } => handle_list(conn_mgr, *json),
        Path => handle_path(conn_mgr),
        Show { name } => handle_show(conn_mgr, name),
        Set {
            name,
            host,
            organization,
            token,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => handle_set(
            conn_mgr,
            name,
            host,
            organization,
            token,
            #[cfg(feature = "secure-storage")]
            *use_keyring,
        ),
        Remove { name, yes } => handle_remove(conn_mgr, name, *yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn handle_list(conn_mgr: &ConnectionManager, json: bool) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default = conn_mgr.config.default_profile.as_deref();

    if json {
        let list: Vec<serde_json::Value> = profiles
            .iter()
            .map(|(name, profile)| {
                serde_json::json!({
                    "name": name,
                    "host": profile.host,
                    "organization": profile.organization,
                    "is_default": default == Some(name.as_str()),
                    "uses_keyring": profile.uses_keyring(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "config_path": conn_mgr.config_file().ok().map(|p| p.display().to_string()),
            "profiles": list,
            "count": profiles.len(),
        });
        println!("{}", serde_json::to_string(&output).map_err(|e| DbCtlError::OutputError {
            message: e.to_string(),
        })?);
        return Ok(());
    }

    if let Ok(path) = conn_mgr.config_file() {
        println!("Configuration file: {}", path.display());
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'dbctl profile set' to create a profile.");
        return Ok(());
    }

    for (name, profile) in &profiles {
        if default == Some(name.as_str()) {
            println!("  {} {}", name.bold().cyan(), "(default)".green());
        } else {
            println!("  {}", name.bold().cyan());
        }
        println!("    {} {}", "Host:".dimmed(), profile.host);
        println!("    {} {}", "Org:".dimmed(), profile.organization);
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager) -> CliResult<()> {
    println!("{}", conn_mgr.config_file()?.display());
    Ok(())
}

fn handle_show(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| DbCtlError::ProfileNotFound { name: name.into() })?;

    println!("Profile: {}", name);
    println!("Host: {}", profile.host);
    println!("Organization: {}", profile.organization);
    println!("Token: {}", mask_token(&profile.token));
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("Default: yes");
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    host: &str,
    organization: &str,
    token: &Option<String>,
    #[cfg(feature = "secure-storage")] use_keyring: bool,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    let token = match token {
        Some(t) => t.clone(),
        None => rpassword::prompt_password("Token: ").map_err(|e| DbCtlError::InvalidInput {
            message: format!("Failed to read token: {}", e),
        })?,
    };
    if token.trim().is_empty() {
        return Err(DbCtlError::InvalidInput {
            message: "Token must not be empty".to_string(),
        });
    }

    #[cfg(feature = "secure-storage")]
    let store = if use_keyring {
        SecretStore::new()
    } else {
        SecretStore::plaintext()
    };
    #[cfg(not(feature = "secure-storage"))]
    let store = SecretStore::plaintext();

    let stored_token = store.store(&format!("{}-token", name), &token)?;
    if SecretStore::is_keyring_reference(&stored_token) {
        info!("Stored token for {} in the OS keyring", name);
    }

    let mut config = conn_mgr.config.clone();
    let is_first = config.profiles.is_empty();
    config.set_profile(name.to_string(), Profile::new(host, organization, stored_token));
    conn_mgr.save_config(&config)?;

    println!("Profile '{}' saved successfully to:", name);
    println!("  {}", conn_mgr.config_file()?.display());

    if is_first {
        println!();
        println!("Tip: Set it as the default profile with:");
        println!("  dbctl profile default {}", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, yes: bool) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    let Some(profile) = conn_mgr.config.profiles.get(name) else {
        return Err(DbCtlError::ProfileNotFound { name: name.into() });
    };

    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if is_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    if !yes && !confirm(&format!("Are you sure you want to remove profile '{}'?", name))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    if profile.uses_keyring()
        && let Err(e) = SecretStore::new().delete(&profile.token)
    {
        debug!("Could not delete keyring entry for {}: {}", name, e);
    }

    let mut config = conn_mgr.config.clone();
    config.remove_profile(name);
    conn_mgr.save_config(&config)?;

    if is_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(DbCtlError::ProfileNotFound { name: name.into() });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    conn_mgr.save_config(&config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

fn confirm(question: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(|e| DbCtlError::InvalidInput {
            message: format!("Input cancelled: {}", e),
        })
}

/// Show only enough of a token to tell profiles apart
fn mask_token(token: &str) -> String {
    if SecretStore::is_keyring_reference(token) {
        return "(stored in keyring)".to_string();
    }
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
