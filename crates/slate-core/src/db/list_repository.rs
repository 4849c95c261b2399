//! List storage and mutation tracking

use rusqlite::{params, Connection};

use super::bad_column;
use crate::error::{Error, Result};
use crate::models::{List, ListId, SyncStatus};
use crate::protocol::Tombstone;
use crate::util::bump_timestamp;

/// Trait for list storage operations
pub trait ListRepository {
    /// Insert a locally created list
    fn insert(&self, list: &List) -> Result<()>;

    /// Get a list by ID (excluding tombstoned)
    fn get(&self, id: &ListId) -> Result<Option<List>>;

    /// All non-tombstoned lists, oldest first
    fn list(&self) -> Result<Vec<List>>;

    /// Write back a locally mutated list (caller bumps `updated_at` first)
    fn update(&self, list: &List) -> Result<()>;

    /// Tombstone a list and cascade to its tasks in the same transaction
    fn delete(&self, id: &ListId) -> Result<()>;

    /// All dirty, non-tombstoned lists
    fn dirty(&self) -> Result<Vec<List>>;

    /// Deletion markers for all tombstoned lists
    fn tombstones(&self) -> Result<Vec<Tombstone<ListId>>>;

    /// Clear the dirty flag for exactly the snapshotted `(id, updated_at)`
    /// pairs; a record re-edited after the snapshot stays dirty
    fn mark_synced(&self, snapshot: &[(ListId, i64)]) -> Result<usize>;

    /// Physically delete acknowledged tombstones
    fn purge(&self, ids: &[ListId]) -> Result<usize>;

    /// Unconditional upsert of a server-resolved record, stored clean
    fn apply_remote(&self, list: &List) -> Result<()>;

    /// Physical delete for a tombstone id received on pull
    fn remove(&self, id: &ListId) -> Result<()>;
}

/// `SQLite` implementation of `ListRepository`
pub struct SqliteListRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteListRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a list from a database row
    fn parse_list(row: &rusqlite::Row<'_>) -> rusqlite::Result<List> {
        let id: String = row.get(0)?;
        Ok(List {
            id: id.parse().map_err(|error| bad_column(0, error))?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            color: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            sync_status: SyncStatus::from_i64(row.get(6)?)
                .map_err(|error| bad_column(6, error))?,
        })
    }
}

const LIST_COLUMNS: &str = "id, owner_id, name, color, created_at, updated_at, sync_status";

impl ListRepository for SqliteListRepository<'_> {
    fn insert(&self, list: &List) -> Result<()> {
        self.conn.execute(
            "INSERT INTO lists (id, owner_id, name, color, created_at, updated_at, sync_status)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                list.id.as_str(),
                list.owner_id,
                list.name,
                list.color,
                list.created_at,
                list.updated_at,
                list.sync_status.as_i64()
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &ListId) -> Result<Option<List>> {
        let result = self.conn.query_row(
            &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ? AND sync_status != 2"),
            params![id.as_str()],
            Self::parse_list,
        );

        match result {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<List>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE sync_status != 2 ORDER BY created_at ASC"
        ))?;

        let lists = stmt
            .query_map([], Self::parse_list)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lists)
    }

    fn update(&self, list: &List) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE lists SET name = ?, color = ?, updated_at = ?, sync_status = ?
             WHERE id = ? AND sync_status != 2",
            params![
                list.name,
                list.color,
                list.updated_at,
                list.sync_status.as_i64(),
                list.id.as_str()
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(list.id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &ListId) -> Result<()> {
        let current: i64 = self
            .conn
            .query_row(
                "SELECT updated_at FROM lists WHERE id = ? AND sync_status != 2",
                params![id.as_str()],
                |row| row.get(0),
            )
            .map_err(|_| Error::NotFound(id.to_string()))?;
        let deleted_at = bump_timestamp(current);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE lists SET sync_status = 2, updated_at = ? WHERE id = ?",
            params![deleted_at, id.as_str()],
        )?;
        // Local mirror of the server-enforced cascade; keeps reads consistent
        // before the next sync and lets purge clean the whole subtree.
        tx.execute(
            "UPDATE tasks SET sync_status = 2, updated_at = MAX(updated_at + 1, ?)
             WHERE list_id = ? AND sync_status != 2",
            params![deleted_at, id.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn dirty(&self) -> Result<Vec<List>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE sync_status = 1 ORDER BY updated_at ASC"
        ))?;

        let lists = stmt
            .query_map([], Self::parse_list)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lists)
    }

    fn tombstones(&self) -> Result<Vec<Tombstone<ListId>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, updated_at FROM lists WHERE sync_status = 2")?;

        let tombstones = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                Ok(Tombstone {
                    id: id.parse().map_err(|error| bad_column(0, error))?,
                    deleted_at: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tombstones)
    }

    fn mark_synced(&self, snapshot: &[(ListId, i64)]) -> Result<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE lists SET sync_status = 0
             WHERE id = ? AND updated_at <= ? AND sync_status = 1",
        )?;

        let mut cleared = 0;
        for (id, updated_at) in snapshot {
            cleared += stmt.execute(params![id.as_str(), updated_at])?;
        }
        Ok(cleared)
    }

    fn purge(&self, ids: &[ListId]) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM lists WHERE id = ? AND sync_status = 2")?;

        let mut purged = 0;
        for id in ids {
            purged += stmt.execute(params![id.as_str()])?;
        }
        Ok(purged)
    }

    fn apply_remote(&self, list: &List) -> Result<()> {
        self.conn.execute(
            "INSERT INTO lists (id, owner_id, name, color, created_at, updated_at, sync_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
             ON CONFLICT(id) DO UPDATE SET
                 owner_id = ?2, name = ?3, color = ?4,
                 created_at = ?5, updated_at = ?6, sync_status = 0",
            params![
                list.id.as_str(),
                list.owner_id,
                list.name,
                list.color,
                list.created_at,
                list.updated_at
            ],
        )?;
        Ok(())
    }

    fn remove(&self, id: &ListId) -> Result<()> {
        self.conn
            .execute("DELETE FROM lists WHERE id = ?", params![id.as_str()])?;
        Ok(())
    }
}
