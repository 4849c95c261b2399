//! Task-list model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SyncStatus;
use crate::util::{bump_timestamp, now_ms};

/// Default list color, matching the clients' palette.
pub const DEFAULT_LIST_COLOR: &str = "#3B82F6";

/// A unique identifier for a list, using UUID v7 (time-sortable).
///
/// Assigned once by the creating client and never reused, so the server can
/// upsert by id without an allocation round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(Uuid);

impl ListId {
    /// Create a new unique list ID using UUID v7
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

impl Default for ListId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A task list owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Unique identifier
    pub id: ListId,
    /// Owning user id (the authenticated subject on the server)
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Display color (hex)
    pub color: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last mutation timestamp (Unix ms), the LWW key
    pub updated_at: i64,
    /// Local sync state; never serialized to the wire
    #[serde(skip)]
    pub sync_status: SyncStatus,
}

impl List {
    /// Create a new list, locally dirty until first acknowledged.
    #[must_use]
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, color: Option<&str>) -> Self {
        let now = now_ms();
        Self {
            id: ListId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            color: color.unwrap_or(DEFAULT_LIST_COLOR).to_string(),
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
