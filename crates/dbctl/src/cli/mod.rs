//! CLI structure and command definitions
//!
//! `database` commands talk to the control plane; `profile` commands only
//! touch the local profile config.

use clap::{Parser, Subcommand};

pub mod database;

pub use database::*;

/// Manage cloud Postgres databases from the command line
#[derive(Parser, Debug)]
#[command(name = "dbctl")]
#[command(version, about = "Manage managed Postgres database instances")]
#[command(long_about = "
Manage managed Postgres database instances

EXAMPLES:
    # Set up a profile
    dbctl profile set prod --organization acme --token <token>

    # Provision a database and wait until it is available
    dbctl database create orders --admin-user admin --wait

    # Inspect instances as JSON for scripting
    dbctl database list --json

    # Point the local app config at a cloud database
    dbctl database connect orders

For more help on a specific command, run:
    dbctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "DBCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "DBCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Control-plane host (overrides the profile)
    #[arg(long, global = true, env = "DBCTL_HOST")]
    pub host: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Managed database operations
    #[command(subcommand, visible_alias = "db")]
    Database(DatabaseCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    dbctl profile set prod --organization acme --token <token>

    # Use a self-hosted control plane
    dbctl profile set staging --host cloud.staging.example.com --organization acme --token <token>

    # List all profiles
    dbctl profile list

    # Pick the default profile
    dbctl profile default prod
")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List {
        /// Print a single line of JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    Set {
        /// Profile name
        name: String,

        /// Control-plane host
        #[arg(long, default_value = dbctl_core::config::DEFAULT_HOST)]
        host: String,

        /// Organization that owns the databases
        #[arg(long)]
        organization: String,

        /// Bearer token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Store the token in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to use when --profile is not given
        name: String,
    },
}
