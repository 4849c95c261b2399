//! Wire shapes for the push/pull/full sync protocol.
//!
//! Shared verbatim by the client transport and the server handlers so the
//! two sides cannot drift. All timestamps are epoch milliseconds.

use serde::{Deserialize, Serialize};

use crate::models::{List, ListId, Task, TaskId};

/// A deletion marker pushed to (or stored by) the server.
///
/// Carries the deleting client's timestamp so the reconciler can apply the
/// same last-write-wins comparison to deletes as to edits; a bare id would
/// make the outcome depend on batch arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone<Id> {
    pub id: Id,
    pub deleted_at: i64,
}

/// Client -> server: everything locally dirty or tombstoned, as one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub deleted_lists: Vec<Tombstone<ListId>>,
    #[serde(default)]
    pub deleted_tasks: Vec<Tombstone<TaskId>>,
}

impl PushRequest {
    /// True when there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
            && self.tasks.is_empty()
            && self.deleted_lists.is_empty()
            && self.deleted_tasks.is_empty()
    }
}

/// Why the reconciler refused to store a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The record id exists but belongs to another user.
    NotOwned,
    /// The task references a list the server has never seen.
    UnknownList,
    /// The task references a list that is tombstoned.
    ListDeleted,
    /// Required name/title field is empty.
    EmptyName,
}

/// Per-record result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The incoming write was stored.
    Applied,
    /// The server already holds a same-or-newer version; the caller's copy
    /// is corrected on its next pull.
    Stale,
    /// The record was refused and will never be accepted as-is.
    Rejected(RejectReason),
}

/// An upsert result keyed by the record's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    pub id: String,
    pub outcome: RecordOutcome,
}

/// Server -> client acknowledgment for a push batch.
///
/// `synced_*` counts acknowledged upserts (applied or stale); `deleted_*`
/// counts acknowledged tombstones. Replaying an unchanged batch therefore
/// returns identical counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    pub synced_lists: usize,
    pub synced_tasks: usize,
    pub deleted_lists: usize,
    pub deleted_tasks: usize,
    pub list_results: Vec<RecordResult>,
    pub task_results: Vec<RecordResult>,
    pub server_time: i64,
}

/// Client -> server: request for changes after the sync cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Server-issued cursor from the previous pull; `None` means full pull.
    pub last_sync: Option<i64>,
}

/// Server -> client: everything changed after the cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    pub lists: Vec<List>,
    pub tasks: Vec<Task>,
    pub deleted_list_ids: Vec<ListId>,
    pub deleted_task_ids: Vec<TaskId>,
    /// The next cursor; server-clock based so client skew cannot open gaps.
    pub server_time: i64,
}

/// Push and pull composed into one round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullSyncRequest {
    #[serde(flatten)]
    pub push: PushRequest,
    pub last_sync: Option<i64>,
}

/// Response to a full sync: the push acknowledgment plus the pull delta,
/// with identical semantics to calling push then pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullSyncResponse {
    pub push: PushResponse,
    pub pull: PullResponse,
}
