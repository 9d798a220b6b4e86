//! Database command definitions

use clap::{Args, Subcommand};

/// Arguments shared by operations that can wait for the instance to be ready
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Wait until the database is available
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds (default: wait indefinitely)
    #[arg(long, requires = "wait")]
    pub wait_timeout: Option<u64>,
}

/// Managed database commands
#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Provision a new managed database instance
    #[command(visible_alias = "provision")]
    #[command(after_help = "EXAMPLES:
    # Create and return immediately
    dbctl database create orders --admin-user admin

    # Create and wait up to 10 minutes for it to become available
    dbctl database create orders --admin-user admin --wait --wait-timeout 600
")]
    Create {
        /// Instance name
        name: String,

        /// Administrator username
        #[arg(long, short = 'U')]
        admin_user: String,

        /// Administrator password (prompted for when omitted)
        #[arg(long, short = 'W')]
        password: Option<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Register an existing Postgres database you host yourself
    Link {
        /// Instance name
        name: String,

        /// Hostname of the existing database
        #[arg(long, short = 'H')]
        hostname: String,

        /// Port of the existing database
        #[arg(long, default_value_t = 5432)]
        port: u16,

        /// Password of the existing database (prompted for when omitted)
        #[arg(long, short = 'W')]
        password: Option<String>,

        /// Capture provenance for time-travel debugging
        #[arg(long)]
        enable_provenance: bool,
    },

    /// Delete a managed database instance
    #[command(visible_alias = "rm", visible_alias = "destroy")]
    Delete {
        /// Instance name
        name: String,
    },

    /// Unregister a linked database
    Unlink {
        /// Instance name
        name: String,
    },

    /// Show one database instance
    #[command(visible_alias = "status", visible_alias = "show")]
    Get {
        /// Instance name
        name: String,

        /// Print a single line of JSON
        #[arg(long)]
        json: bool,
    },

    /// List database instances in the organization
    #[command(visible_alias = "ls")]
    List {
        /// Print a single line of JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a new administrator password
    #[command(name = "reset-password", visible_alias = "reset")]
    ResetPassword {
        /// Instance name
        name: String,

        /// New password (prompted for when omitted)
        #[arg(long, short = 'W')]
        password: Option<String>,
    },

    /// Restore a point-in-time copy into a new instance
    #[command(after_help = "EXAMPLES:
    # Restore the state of 'orders' at 08:00 UTC into 'orders-restored'
    dbctl database restore orders --target orders-restored --timestamp 2024-03-15T08:00:00Z --wait
")]
    Restore {
        /// Source instance name
        name: String,

        /// Name of the new instance to restore into
        #[arg(long, short)]
        target: String,

        /// Point in time to restore (RFC 3339, e.g. 2024-03-15T08:00:00Z)
        #[arg(long)]
        timestamp: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Point the local app config at a database instance
    #[command(after_help = "EXAMPLES:
    # Rewrite ./dbos-config.yaml (a timestamped backup is kept)
    dbctl database connect orders

    # Use a config file elsewhere
    dbctl database connect orders --app-config ../app/dbos-config.yaml
")]
    Connect {
        /// Instance name
        name: String,

        /// Database password to write into the config (prompted for when omitted)
        #[arg(long, short = 'W')]
        password: Option<String>,

        /// Local app config file to rewrite
        #[arg(long, default_value = dbctl_core::local_config::DEFAULT_LOCAL_CONFIG)]
        app_config: String,
    },
}
