//! Push-then-pull sync cycles over a `SyncTransport`.

use tokio::sync::Mutex;

use super::{SyncError, SyncTransport};
use crate::error::Result;
use crate::protocol::{
    FullSyncRequest, PullRequest, PullResponse, PushResponse, RecordOutcome, RecordResult,
};
use crate::store::{LocalStore, PushBatch};

/// What a sync invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A full push/pull cycle completed.
    Completed(SyncReport),
    /// No network; nothing changed, the next tick retries.
    SkippedOffline,
    /// No credential; nothing changed.
    SkippedUnauthenticated,
    /// Another invocation is already in flight.
    AlreadyRunning,
}

/// Counters from a completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed_lists: usize,
    pub pushed_tasks: usize,
    pub pushed_tombstones: usize,
    pub rejected_records: usize,
    pub pulled_lists: usize,
    pub pulled_tasks: usize,
    pub removed_records: usize,
    pub cursor: i64,
}

/// Orchestrates sync cycles: snapshot-push, acknowledge, pull, advance the
/// cursor. A `try_lock` guard serializes overlapping invocations (timer and
/// manual refresh may fire together).
pub struct SyncCoordinator<T: SyncTransport> {
    store: LocalStore,
    transport: T,
    in_flight: Mutex<()>,
}

impl<T: SyncTransport> SyncCoordinator<T> {
    /// Create a coordinator over a local store and a transport.
    pub const fn new(store: LocalStore, transport: T) -> Self {
        Self {
            store,
            transport,
            in_flight: Mutex::const_new(()),
        }
    }

    /// The underlying store, for callers that also read/write records.
    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Run one push-then-pull cycle.
    ///
    /// Local flags are only touched on server acknowledgment, so a failure
    /// at any point leaves the store exactly as it was, safe to retry.
    pub async fn run(&self) -> Result<SyncOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("sync already in flight, skipping");
            return Ok(SyncOutcome::AlreadyRunning);
        };
        if !self.transport.is_authenticated() {
            tracing::debug!("not authenticated, skipping sync");
            return Ok(SyncOutcome::SkippedUnauthenticated);
        }

        let mut report = SyncReport::default();
        let batch = self.store.collect_batch().await?;
        if !batch.is_empty() {
            match self.transport.push(batch.request.clone()).await {
                Ok(response) => self.acknowledge_push(&batch, &response, &mut report).await?,
                Err(SyncError::Offline(reason)) => {
                    tracing::debug!("offline, skipping sync: {reason}");
                    return Ok(SyncOutcome::SkippedOffline);
                }
                Err(SyncError::Unauthenticated) => {
                    return Ok(SyncOutcome::SkippedUnauthenticated);
                }
                // A failed push loses nothing: the same batch (plus anything
                // newly dirtied) goes out on the next cycle. The pull below
                // still runs against the previous cursor.
                Err(error) => tracing::warn!("push failed, will retry next cycle: {error}"),
            }
        }

        let cursor = self.store.last_sync().await?;
        match self.transport.pull(PullRequest { last_sync: cursor }).await {
            Ok(response) => {
                self.apply_pull(&response, &mut report).await?;
                Ok(SyncOutcome::Completed(report))
            }
            Err(SyncError::Offline(reason)) => {
                tracing::debug!("offline, skipping pull: {reason}");
                Ok(SyncOutcome::SkippedOffline)
            }
            Err(SyncError::Unauthenticated) => Ok(SyncOutcome::SkippedUnauthenticated),
            Err(error) => Err(error.into()),
        }
    }

    /// Run one cycle through the composed full-sync round trip.
    pub async fn run_full(&self) -> Result<SyncOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("sync already in flight, skipping");
            return Ok(SyncOutcome::AlreadyRunning);
        };
        if !self.transport.is_authenticated() {
            return Ok(SyncOutcome::SkippedUnauthenticated);
        }

        let batch = self.store.collect_batch().await?;
        let request = FullSyncRequest {
            push: batch.request.clone(),
            last_sync: self.store.last_sync().await?,
        };

        let mut report = SyncReport::default();
        match self.transport.full_sync(request).await {
            Ok(response) => {
                if !batch.is_empty() {
                    self.acknowledge_push(&batch, &response.push, &mut report)
                        .await?;
                }
                self.apply_pull(&response.pull, &mut report).await?;
                Ok(SyncOutcome::Completed(report))
            }
            Err(SyncError::Offline(reason)) => {
                tracing::debug!("offline, skipping sync: {reason}");
                Ok(SyncOutcome::SkippedOffline)
            }
            Err(SyncError::Unauthenticated) => Ok(SyncOutcome::SkippedUnauthenticated),
            Err(error) => Err(error.into()),
        }
    }

    async fn acknowledge_push(
        &self,
        batch: &PushBatch,
        response: &PushResponse,
        report: &mut SyncReport,
    ) -> Result<()> {
        report.rejected_records =
            log_rejections(&response.list_results) + log_rejections(&response.task_results);

        // Rejected records are acknowledged too: the server will never
        // accept them as-is, so re-pushing forever helps nobody.
        self.store.mark_batch_synced(batch).await?;

        report.pushed_lists = response.synced_lists;
        report.pushed_tasks = response.synced_tasks;
        report.pushed_tombstones = response.deleted_lists + response.deleted_tasks;
        tracing::info!(
            lists = response.synced_lists,
            tasks = response.synced_tasks,
            tombstones = report.pushed_tombstones,
            rejected = report.rejected_records,
            "push acknowledged"
        );
        Ok(())
    }

    async fn apply_pull(&self, response: &PullResponse, report: &mut SyncReport) -> Result<()> {
        self.store.apply_pull(response).await?;
        self.store.set_last_sync(response.server_time).await?;

        report.pulled_lists = response.lists.len();
        report.pulled_tasks = response.tasks.len();
        report.removed_records =
            response.deleted_list_ids.len() + response.deleted_task_ids.len();
        report.cursor = response.server_time;
        tracing::info!(
            lists = report.pulled_lists,
            tasks = report.pulled_tasks,
            removed = report.removed_records,
            cursor = report.cursor,
            "pull applied"
        );
        Ok(())
    }
}

fn log_rejections(results: &[RecordResult]) -> usize {
    let mut rejected = 0;
    for result in results {
        if let RecordOutcome::Rejected(reason) = result.outcome {
            tracing::warn!(id = %result.id, ?reason, "server rejected record");
            rejected += 1;
        }
    }
    rejected
}
