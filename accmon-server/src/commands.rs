use std::sync::Arc;
use std::time::Duration;

use accmon_client::watch::{run_watch, spawn_stdin_reader, WatchOptions};
use accmon_client::{ClientConfig, CredentialStore, MonitorClient};
use accmon_types::AccountFilter;
use anyhow::{Context, Result};

use crate::cli::{ConnectArgs, FilterArgs, ServeArgs, SnapshotArgs, WatchArgs};
use crate::middleware::SecurityConfig;
use crate::registry::{start_reload, AccountRegistry, MemoryRegistry};
use crate::router::build_router;
use crate::server_utils::{create_listener, shutdown_signal};
use crate::snapshot_command::print_snapshot;
use crate::state::AppState;

pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    tracing::info!("accmon server starting on {}:{}...", args.bind, args.port);

    let registry: Option<Arc<dyn AccountRegistry>> = match &args.auth_dir {
        Some(dir) => {
            let registry = Arc::new(
                MemoryRegistry::load_dir(dir).context("Failed to load account registry")?,
            );
            if registry.is_empty() {
                tracing::warn!("[Registry] No accounts found in {}", dir.display());
            } else {
                tracing::info!("[Registry] Loaded {} accounts from {}", registry.len(), dir.display());
            }
            if args.reload_secs > 0 {
                start_reload(registry.clone(), dir.clone(), Duration::from_secs(args.reload_secs));
            }
            Some(registry)
        },
        None => {
            tracing::warn!("[Registry] No auth directory configured; accounts monitor will report 503");
            None
        },
    };

    let security = SecurityConfig::new(args.management_key.clone());
    if !security.has_key() {
        tracing::warn!("[Auth] No management key configured; management API requests will be rejected");
    }

    let app = build_router(AppState::new(registry, security));
    let listener = create_listener(&args.bind, args.port).await?;
    tracing::info!(
        "Account monitor page at http://{}:{}/v0/management/accounts-monitor/page",
        args.bind,
        args.port
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Runs on a current-thread runtime; the session itself lives in a `LocalSet`.
pub async fn handle_watch(args: WatchArgs) -> Result<()> {
    let store = credential_store(&args.connect)?;
    let client = connect(&args.connect, &store).await?;
    let options = WatchOptions { filter: build_filter(&args.filter), interval: args.interval };

    run_watch(client, store, options, spawn_stdin_reader(), std::io::stdout()).await?;
    Ok(())
}

pub async fn handle_snapshot(args: SnapshotArgs) -> Result<()> {
    let store = credential_store(&args.connect)?;
    let client = connect(&args.connect, &store).await?;

    let snapshot = match client.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_auth_challenge() => anyhow::bail!(
            "{} (pass --management-key or save one to {})",
            e,
            store.path().display()
        ),
        Err(e) => return Err(e.into()),
    };

    print_snapshot(&snapshot, &build_filter(&args.filter), args.json)
}

fn credential_store(args: &ConnectArgs) -> Result<CredentialStore> {
    match &args.key_file {
        Some(path) => Ok(CredentialStore::new(path.clone())),
        None => Ok(CredentialStore::default_location()?),
    }
}

/// Explicit key wins over the stored one.
async fn connect(args: &ConnectArgs, store: &CredentialStore) -> Result<MonitorClient> {
    let management_key = match args.management_key.clone().filter(|k| !k.trim().is_empty()) {
        Some(key) => Some(key),
        None => store.load()?,
    };

    if let Some(url) = &args.url {
        let config =
            ClientConfig { base_url: url.clone(), management_key, ..Default::default() };
        return Ok(MonitorClient::new(config)?);
    }

    match MonitorClient::auto_discover(management_key.clone()).await {
        Ok(client) => Ok(client),
        Err(e) => {
            tracing::warn!("{}; falling back to the default address", e);
            Ok(MonitorClient::new(ClientConfig { management_key, ..Default::default() })?)
        },
    }
}

fn build_filter(args: &FilterArgs) -> AccountFilter {
    AccountFilter::new().with_provider(args.provider.as_deref()).with_status(args.status)
}
