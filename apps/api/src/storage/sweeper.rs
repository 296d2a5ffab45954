use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::FileStore;

/// Handle to the background sweep task. Dropping it leaves the task running;
/// call [`stop`](Self::stop) to end it.
pub struct SweepHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub async fn stop(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

/// Starts a task that removes expired entries from `store` every `period`.
pub fn spawn_sweeper(store: Arc<FileStore>, period: Duration) -> SweepHandle {
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        // `interval` panics on a zero period.
        let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so a fresh store is
        // not swept at startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = store.sweep_expired(Utc::now()).await;
                    if removed > 0 {
                        info!(removed, remaining = store.len(), "Swept expired uploads");
                    }
                }
            }
        }
        debug!("File store sweeper stopped");
    });

    SweepHandle { token, task }
}
