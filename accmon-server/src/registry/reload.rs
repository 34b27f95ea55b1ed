use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{load_auth_dir, MemoryRegistry};

/// Re-read `dir` into `registry` every `period`.
///
/// A failed read keeps the current records.
pub fn start_reload(registry: Arc<MemoryRegistry>, dir: PathBuf, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("[Registry] Reloading {} every {:?}", dir.display(), period);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let path = dir.clone();
            match tokio::task::spawn_blocking(move || load_auth_dir(&path)).await {
                Ok(Ok(records)) => {
                    let count = records.len();
                    registry.replace(records);
                    tracing::debug!("[Registry] Reloaded {} accounts", count);
                },
                Ok(Err(e)) => tracing::warn!("[Registry] Reload failed: {}", e),
                Err(e) => tracing::error!("[Registry] Reload task panicked: {}", e),
            }
        }
    })
}
