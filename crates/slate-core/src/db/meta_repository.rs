//! Key-value metadata storage (sync cursor)

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

const LAST_SYNC_KEY: &str = "last_sync";

/// Trait for client metadata storage
pub trait MetaRepository {
    /// The server-issued cursor from the last completed pull, if any
    fn last_sync(&self) -> Result<Option<i64>>;

    /// Advance the cursor to a server-reported timestamp
    fn set_last_sync(&self, server_time: i64) -> Result<()>;

    /// Forget the cursor (forces a full pull on the next sync)
    fn clear_last_sync(&self) -> Result<()>;
}

/// `SQLite` implementation of `MetaRepository`
pub struct SqliteMetaRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMetaRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl MetaRepository for SqliteMetaRepository<'_> {
    fn last_sync(&self) -> Result<Option<i64>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?",
                params![LAST_SYNC_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.and_then(|v| v.parse().ok()))
    }

    fn set_last_sync(&self, server_time: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![LAST_SYNC_KEY, server_time.to_string()],
        )?;
        Ok(())
    }

    fn clear_last_sync(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM meta WHERE key = ?", params![LAST_SYNC_KEY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_cursor_absent_initially() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteMetaRepository::new(db.connection());
        assert_eq!(repo.last_sync().unwrap(), None);
    }

    #[test]
    fn test_cursor_roundtrip_and_overwrite() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteMetaRepository::new(db.connection());

        repo.set_last_sync(1_700_000_000_000).unwrap();
        assert_eq!(repo.last_sync().unwrap(), Some(1_700_000_000_000));

        repo.set_last_sync(1_700_000_000_500).unwrap();
        assert_eq!(repo.last_sync().unwrap(), Some(1_700_000_000_500));
    }

    #[test]
    fn test_cursor_clear() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteMetaRepository::new(db.connection());

        repo.set_last_sync(42).unwrap();
        repo.clear_last_sync().unwrap();
        assert_eq!(repo.last_sync().unwrap(), None);
    }
}
