use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use dbctl_core::{Config, FAILURE, SUCCESS};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::{CliDiagnostic, DbCtlError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let config_path = cli.config_file.as_ref().map(PathBuf::from);
    let loaded = match &config_path {
        Some(path) => {
            debug!("Loading config from explicit path: {:?}", path);
            Config::load_from_path(path)
        }
        None => {
            debug!("Loading config from default location");
            Config::load()
        }
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            let location = config_path
                .clone()
                .or_else(|| Config::config_path().ok())
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            CliDiagnostic::error(&e.to_string())
                .detail(&format!("while loading {}", location))
                .tip("fix or move the file aside, then recreate profiles with:", &[
                    "dbctl profile set <name> --organization <org> --token <token>",
                ])
                .print();
            std::process::exit(FAILURE);
        }
    };

    let conn_mgr = ConnectionManager::new(config)
        .with_config_path(config_path)
        .with_profile(cli.profile.clone())
        .with_host(cli.host.clone());

    let code = match execute_command(&cli, &conn_mgr).await {
        Ok(code) => code,
        Err(e) => {
            e.print_diagnostic();
            FAILURE
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "dbctl=warn,dbctl_core=warn",
            1 => "dbctl=info,dbctl_core=info",
            2 => "dbctl=debug,dbctl_core=debug",
            _ => "dbctl=trace,dbctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    // Logs go to stderr; stdout carries command output only
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(verbose > 0)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<i32, DbCtlError> {
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            println!("dbctl {}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(SUCCESS)
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr)
                .await
                .map(|()| SUCCESS)
        }
        Commands::Database(db_cmd) => {
            commands::database::handle_database_command(db_cmd, conn_mgr).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(code) if *code == SUCCESS => info!("Command completed successfully in {:?}", duration),
        Ok(code) => info!("Command exited with status {} after {:?}", code, duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    use cli::DatabaseCommands as Db;
    use cli::ProfileCommands as Prof;

    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => match cmd {
            Prof::List { .. } => "profile list".to_string(),
            Prof::Path => "profile path".to_string(),
            Prof::Show { name } => format!("profile show {}", name),
            Prof::Set { name, .. } => format!("profile set {} [token redacted]", name),
            Prof::Remove { name, .. } => format!("profile remove {}", name),
            Prof::Default { name } => format!("profile default {}", name),
        },
        Commands::Database(cmd) => match cmd {
            Db::Create { name, wait, .. } => {
                format!("database create {} [password redacted] wait={}", name, wait.wait)
            }
            Db::Link { name, hostname, port, .. } => {
                format!("database link {} {}:{} [password redacted]", name, hostname, port)
            }
            Db::Delete { name } => format!("database delete {}", name),
            Db::Unlink { name } => format!("database unlink {}", name),
            Db::Get { name, .. } => format!("database get {}", name),
            Db::List { .. } => "database list".to_string(),
            Db::ResetPassword { name, .. } => {
                format!("database reset-password {} [password redacted]", name)
            }
            Db::Restore { name, target, timestamp, .. } => {
                format!("database restore {} -> {} at {}", name, target, timestamp)
            }
            Db::Connect { name, app_config, .. } => {
                format!("database connect {} ({})", name, app_config)
            }
        },
    }
}
