//! accmon - Accounts status monitor
//!
//! A single binary that:
//! - Serves the accounts monitor JSON on `/v0/management/accounts-monitor`
//! - Serves the HTML dashboard on `/v0/management/accounts-monitor/page`
//! - Renders the same data live in a terminal (`accmon watch`)
//!
//! Access via: http://localhost:8317

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod middleware;
mod monitor;
mod registry;
mod router;
mod server_utils;
mod snapshot_command;
mod state;
#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve(cli.serve));

    match command {
        Commands::Serve(args) => {
            init_tracing(cli.log_level.as_deref().unwrap_or("info"));
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(commands::handle_serve(args))
        },
        Commands::Watch(args) => {
            init_tracing(cli.log_level.as_deref().unwrap_or("warn"));
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            let result = runtime.block_on(commands::handle_watch(args));
            // Do not wait for in-flight blocking work once the user has quit.
            runtime.shutdown_background();
            result
        },
        Commands::Snapshot(args) => {
            init_tracing(cli.log_level.as_deref().unwrap_or("warn"));
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(commands::handle_snapshot(args))
        },
    }
}

/// Logs go to stderr so terminal views keep stdout to themselves.
fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
