//! Background task driving periodic sync cycles.
//!
//! The task runs one cycle at startup when [`Docs::needs_startup_sync`]
//! says so, then one per interval. Cycles run on the blocking pool and
//! never overlap: the next tick is only awaited once the previous cycle has
//! finished, and missed ticks are skipped rather than queued.
//!
//! Cancellation is cooperative and observed only between cycles; a cycle
//! that has started always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::engine::Docs;

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Token that stops the scheduler when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request shutdown and wait for the current cycle, if any, to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Scheduler task failed");
        }
    }
}

/// Spawn the scheduler onto the current Tokio runtime.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn spawn_scheduler(docs: Arc<Docs>, interval: Duration) -> SchedulerHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_scheduler(docs, interval, cancel.clone()));
    SchedulerHandle { cancel, task }
}

async fn run_scheduler(docs: Arc<Docs>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        apps = docs.apps().len(),
        "Scheduler started"
    );

    if docs.needs_startup_sync(Utc::now()) && !cancel.is_cancelled() {
        tracing::info!("Last update check is stale, syncing now");
        run_cycle(&docs).await;
    }

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!("Scheduler shutting down");
                break;
            }
            _ = ticker.tick() => run_cycle(&docs).await,
        }
    }
}

/// Run one sync cycle on the blocking pool and record the check time.
async fn run_cycle(docs: &Arc<Docs>) {
    let docs = Arc::clone(docs);
    let result = tokio::task::spawn_blocking(move || {
        let outcomes = docs.sync_now();
        docs.record_check();
        outcomes.iter().filter(|o| o.result.is_err()).count()
    })
    .await;

    match result {
        Ok(0) => tracing::debug!("Sync cycle complete"),
        Ok(failed) => tracing::warn!(failed, "Sync cycle complete with failed applications"),
        Err(e) => tracing::error!(error = %e, "Sync cycle panicked"),
    }
}
