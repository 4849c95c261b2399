//! Task model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListId, SyncStatus};
use crate::util::{bump_timestamp, now_ms};

/// A unique identifier for a task, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A task inside a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Owning list
    pub list_id: ListId,
    /// Title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Completion state
    pub completed: bool,
    /// Optional reminder time (Unix ms)
    pub reminder: Option<i64>,
    /// Manual ordering position; carried on the wire but not sync-relevant
    pub position: i64,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last mutation timestamp (Unix ms), the LWW key
    pub updated_at: i64,
    /// Local sync state; never serialized to the wire
    #[serde(skip)]
    pub sync_status: SyncStatus,
}

impl Task {
    /// Create a new task, locally dirty until first acknowledged.
    #[must_use]
    pub fn new(list_id: ListId, title: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: TaskId::new(),
            list_id,
            title: title.into(),
            description: None,
            completed: false,
            reminder: None,
            position: 0,
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Dirty,
        }
    }

    /// Bump `updated_at` for a local mutation and mark the record dirty.
    pub fn touch(&mut self) {
        self.updated_at = bump_timestamp(self.updated_at);
        self.sync_status = SyncStatus::Dirty;
    }
}
