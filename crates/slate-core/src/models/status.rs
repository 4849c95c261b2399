//! Per-record sync state.

use crate::error::{Error, Result};

/// Sync state of a local record.
///
/// A single three-state tag instead of separate dirty/tombstoned booleans:
/// a tombstoned record is always pending push, so the combinations the two
/// booleans would allow never occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Acknowledged by the server at the record's current `updated_at`.
    Clean,
    /// Changed locally since the last acknowledged sync.
    #[default]
    Dirty,
    /// Soft-deleted locally, retained until the server confirms the tombstone.
    Tombstoned,
}

impl SyncStatus {
    /// Integer form stored in the `sync_status` column.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Clean => 0,
            Self::Dirty => 1,
            Self::Tombstoned => 2,
        }
    }

    /// Parse the stored column value.
    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Clean),
            1 => Ok(Self::Dirty),
            2 => Ok(Self::Tombstoned),
            other => Err(Error::Database(format!("invalid sync_status: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            SyncStatus::Clean,
            SyncStatus::Dirty,
            SyncStatus::Tombstoned,
        ] {
            assert_eq!(SyncStatus::from_i64(status.as_i64()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(SyncStatus::from_i64(3).is_err());
        assert!(SyncStatus::from_i64(-1).is_err());
    }

    #[test]
    fn test_new_records_start_dirty() {
        assert_eq!(SyncStatus::default(), SyncStatus::Dirty);
    }
}
