//! Local storage layer for Slate clients.

mod connection;
mod list_repository;
mod meta_repository;
mod migrations;
mod task_repository;

pub use connection::Database;
pub use list_repository::{ListRepository, SqliteListRepository};
pub use meta_repository::{MetaRepository, SqliteMetaRepository};
pub use task_repository::{SqliteTaskRepository, TaskRepository};

/// Map a bad stored value to a rusqlite conversion error for row parsers.
pub(crate) fn bad_column(
    index: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
}
