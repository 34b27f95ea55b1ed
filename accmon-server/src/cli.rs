use std::path::PathBuf;

use accmon_client::RefreshInterval;
use accmon_types::AccountState;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "accmon",
    about = "accmon - Accounts status monitor",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Log filter (defaults to `info` for serve, `warn` for terminal views)
    #[arg(short, long, env = "RUST_LOG", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the monitor server (default if no command specified)")]
    Serve(ServeArgs),

    #[command(about = "Live account monitor in the terminal")]
    Watch(WatchArgs),

    #[command(about = "Fetch one snapshot and print it")]
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(short, long, env = "ACCMON_PORT", default_value = "8317")]
    pub port: u16,

    #[arg(short, long, env = "ACCMON_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(long, env = "ACCMON_AUTH_DIR", help = "Directory of account JSON files")]
    pub auth_dir: Option<PathBuf>,

    #[arg(long, env = "ACCMON_MANAGEMENT_KEY", hide_env_values = true)]
    pub management_key: Option<String>,

    #[arg(
        long,
        env = "ACCMON_RELOAD_SECS",
        default_value = "0",
        help = "Re-read the auth directory every N seconds (0 = never)"
    )]
    pub reload_secs: u64,
}

/// How a terminal command reaches the server.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    #[arg(short, long, env = "ACCMON_URL", help = "Server URL (auto-discovered if omitted)")]
    pub url: Option<String>,

    #[arg(long, env = "ACCMON_MANAGEMENT_KEY", hide_env_values = true)]
    pub management_key: Option<String>,

    #[arg(long, help = "Management key file (default ~/.accmon/management_key)")]
    pub key_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long, help = "Only accounts whose provider contains this text")]
    pub provider: Option<String>,

    #[arg(long, help = "Only accounts in this state (active, error, cooldown, disabled)")]
    pub status: Option<AccountState>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(short, long, default_value = "10", help = "Auto-refresh: off, 5, 10, 30 or 60")]
    pub interval: RefreshInterval,
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(short, long, help = "Output the raw JSON payload")]
    pub json: bool,
}
