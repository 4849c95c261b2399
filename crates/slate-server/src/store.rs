//! Server-side SQLite storage.
//!
//! Unlike the client store, rows here are never physically deleted:
//! tombstones (`deleted_at`) must survive so every device eventually pulls
//! them. Each row also carries a server-assigned `synced_at` receipt stamp,
//! which is what delta queries filter on; last-write-wins comparisons use
//! the client-assigned `updated_at`.

use std::path::Path;

use rusqlite::Connection;

use slate_core::util::now_ms;

use crate::error::AppError;

const CURRENT_VERSION: i64 = 1;

pub struct ServerDb {
    conn: Connection,
    // Monotonic stamp source: strictly increases across every push batch
    // and pull, so a cursor issued by one call can never equal a receipt
    // stamp assigned by a later call in the same millisecond.
    clock: i64,
}

impl ServerDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|error| {
                    AppError::internal(format!("Cannot create database directory: {error}"))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        let mut db = Self { conn, clock: 0 };
        db.configure();
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn, clock: 0 };
        db.configure();
        db.migrate()?;
        Ok(db)
    }

    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Next receipt stamp, strictly greater than every stamp issued before.
    pub fn tick(&mut self) -> i64 {
        self.clock = now_ms().max(self.clock + 1);
        self.clock
    }

    fn configure(&self) {
        // WAL is unavailable for in-memory databases; both pragmas are
        // tuning only.
        self.conn.pragma_update(None, "journal_mode", "WAL").ok();
        self.conn.pragma_update(None, "synchronous", "NORMAL").ok();
    }

    fn migrate(&mut self) -> Result<(), AppError> {
        let version = self.schema_version()?;
        if version < 1 {
            self.migrate_v1()?;
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<i64, AppError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
            [],
        )?;
        let version: Option<i64> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })?;
        Ok(version.unwrap_or(0))
    }

    fn migrate_v1(&mut self) -> Result<(), AppError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "CREATE TABLE lists (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                deleted_at INTEGER,
                synced_at INTEGER NOT NULL
            );
            CREATE INDEX idx_lists_owner_synced ON lists(owner_id, synced_at);

            CREATE TABLE tasks (
                id TEXT PRIMARY KEY,
                list_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                reminder INTEGER,
                position INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                deleted_at INTEGER,
                synced_at INTEGER NOT NULL
            );
            CREATE INDEX idx_tasks_owner_synced ON tasks(owner_id, synced_at);
            CREATE INDEX idx_tasks_list ON tasks(list_id);

            INSERT INTO schema_version (version) VALUES (1);",
        )?;
        tx.commit()?;
        Ok(())
    }
}
