//! Task storage and mutation tracking

use rusqlite::{params, Connection};

use super::bad_column;
use crate::error::{Error, Result};
use crate::models::{ListId, SyncStatus, Task, TaskId};
use crate::protocol::Tombstone;
use crate::util::bump_timestamp;

/// Trait for task storage operations
pub trait TaskRepository {
    /// Insert a locally created task
    fn insert(&self, task: &Task) -> Result<()>;

    /// Get a task by ID (excluding tombstoned)
    fn get(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Non-tombstoned tasks of a list, open before done, in manual order
    fn list_for(&self, list_id: &ListId) -> Result<Vec<Task>>;

    /// Write back a locally mutated task (caller bumps `updated_at` first)
    fn update(&self, task: &Task) -> Result<()>;

    /// Tombstone a task
    fn delete(&self, id: &TaskId) -> Result<()>;

    /// All dirty, non-tombstoned tasks
    fn dirty(&self) -> Result<Vec<Task>>;

    /// Deletion markers for all tombstoned tasks
    fn tombstones(&self) -> Result<Vec<Tombstone<TaskId>>>;

    /// Clear the dirty flag for exactly the snapshotted `(id, updated_at)`
    /// pairs; a record re-edited after the snapshot stays dirty
    fn mark_synced(&self, snapshot: &[(TaskId, i64)]) -> Result<usize>;

    /// Physically delete acknowledged tombstones
    fn purge(&self, ids: &[TaskId]) -> Result<usize>;

    /// Unconditional upsert of a server-resolved record, stored clean
    fn apply_remote(&self, task: &Task) -> Result<()>;

    /// Physical delete for a tombstone id received on pull
    fn remove(&self, id: &TaskId) -> Result<()>;
}

/// `SQLite` implementation of `TaskRepository`
pub struct SqliteTaskRepository<'a> {
    conn: &'a Connection,
}

const TASK_COLUMNS: &str =
    "id, list_id, title, description, completed, reminder, position, created_at, updated_at, sync_status";

impl<'a> SqliteTaskRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a task from a database row
    fn parse_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let id: String = row.get(0)?;
        let list_id: String = row.get(1)?;
        Ok(Task {
            id: id.parse().map_err(|error| bad_column(0, error))?,
            list_id: list_id.parse().map_err(|error| bad_column(1, error))?,
            title: row.get(2)?,
            description: row.get(3)?,
            completed: row.get::<_, i64>(4)? != 0,
            reminder: row.get(5)?,
            position: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            sync_status: SyncStatus::from_i64(row.get(9)?)
                .map_err(|error| bad_column(9, error))?,
        })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks
                 (id, list_id, title, description, completed, reminder, position,
                  created_at, updated_at, sync_status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                task.id.as_str(),
                task.list_id.as_str(),
                task.title,
                task.description,
                i64::from(task.completed),
                task.reminder,
                task.position,
                task.created_at,
                task.updated_at,
                task.sync_status.as_i64()
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let result = self.conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND sync_status != 2"),
            params![id.as_str()],
            Self::parse_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_for(&self, list_id: &ListId) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE list_id = ? AND sync_status != 2
             ORDER BY completed ASC, position ASC, created_at ASC"
        ))?;

        let tasks = stmt
            .query_map(params![list_id.as_str()], Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    fn update(&self, task: &Task) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE tasks SET title = ?, description = ?, completed = ?, reminder = ?,
                 position = ?, updated_at = ?, sync_status = ?
             WHERE id = ? AND sync_status != 2",
            params![
                task.title,
                task.description,
                i64::from(task.completed),
                task.reminder,
                task.position,
                task.updated_at,
                task.sync_status.as_i64(),
                task.id.as_str()
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(task.id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &TaskId) -> Result<()> {
        let current: i64 = self
            .conn
            .query_row(
                "SELECT updated_at FROM tasks WHERE id = ? AND sync_status != 2",
                params![id.as_str()],
                |row| row.get(0),
            )
            .map_err(|_| Error::NotFound(id.to_string()))?;

        self.conn.execute(
            "UPDATE tasks SET sync_status = 2, updated_at = ? WHERE id = ?",
            params![bump_timestamp(current), id.as_str()],
        )?;
        Ok(())
    }

    fn dirty(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE sync_status = 1 ORDER BY updated_at ASC"
        ))?;

        let tasks = stmt
            .query_map([], Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    fn tombstones(&self) -> Result<Vec<Tombstone<TaskId>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, updated_at FROM tasks WHERE sync_status = 2")?;

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

    fn mark_synced(&self, snapshot: &[(TaskId, i64)]) -> Result<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE tasks SET sync_status = 0
             WHERE id = ? AND updated_at <= ? AND sync_status = 1",
        )?;

        let mut cleared = 0;
        for (id, updated_at) in snapshot {
            cleared += stmt.execute(params![id.as_str(), updated_at])?;
        }
        Ok(cleared)
    }

    fn purge(&self, ids: &[TaskId]) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM tasks WHERE id = ? AND sync_status = 2")?;

        let mut purged = 0;
        for id in ids {
            purged += stmt.execute(params![id.as_str()])?;
        }
        Ok(purged)
    }

    fn apply_remote(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks
                 (id, list_id, title, description, completed, reminder, position,
                  created_at, updated_at, sync_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)
             ON CONFLICT(id) DO UPDATE SET
                 list_id = ?2, title = ?3, description = ?4, completed = ?5,
                 reminder = ?6, position = ?7, created_at = ?8, updated_at = ?9,
                 sync_status = 0",
            params![
                task.id.as_str(),
                task.list_id.as_str(),
                task.title,
                task.description,
                i64::from(task.completed),
                task.reminder,
                task.position,
                task.created_at,
                task.updated_at
            ],
        )?;
        Ok(())
    }

    fn remove(&self, id: &TaskId) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?", params![id.as_str()])?;
        Ok(())
    }
}
