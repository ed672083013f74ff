//! Periodic background synchronization.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::project::ProjectSync;

/// Runs pull/push cycles on a timer.
///
/// A new cycle is skipped, never queued, while one is already in
/// flight, and a failed cycle does not stop the timer: the next interval
/// retries best-effort. This is the one place in Skein that catches and
/// logs errors instead of propagating them, so a long-running host
/// survives transient network trouble.
pub struct SyncManager {
    sync: Arc<ProjectSync>,
    project: String,
    dir: PathBuf,
    interval: Duration,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl SyncManager {
    pub fn new(
        sync: Arc<ProjectSync>,
        project: impl Into<String>,
        dir: impl Into<PathBuf>,
        interval: Duration,
    ) -> Self {
        Self {
            sync,
            project: project.into(),
            dir: dir.into(),
            interval,
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    /// `true` while a sync cycle is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Token that stops the timer loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Timer loop. The first tick fires immediately; each subsequent tick
    /// spawns a cycle unless the previous one is still running.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(project = %self.project, "sync manager stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            if self.running.swap(true, Ordering::SeqCst) {
                tracing::debug!(project = %self.project, "previous sync still in flight, skipping tick");
                continue;
            }

            let sync = Arc::clone(&self.sync);
            let running = Arc::clone(&self.running);
            let project = self.project.clone();
            let dir = self.dir.clone();
            tokio::spawn(async move {
                if let Err(e) = Self::cycle(&sync, &project, &dir).await {
                    tracing::warn!(project = %project, error = %e, "periodic sync failed; retrying next interval");
                }
                running.store(false, Ordering::SeqCst);
            });
        }
    }

    /// One pull-then-push cycle.
    async fn cycle(
        sync: &ProjectSync,
        project: &str,
        dir: &PathBuf,
    ) -> crate::error::SyncResult<()> {
        sync.pull_all(project, dir).await?;
        sync.push_all(project, dir).await?;
        Ok(())
    }
}
