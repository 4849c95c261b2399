//! slate-core - Core library for Slate
//!
//! This crate contains the shared models, local SQLite store, wire protocol,
//! and sync engine used by all Slate interfaces (CLI, server tests).

pub mod db;
pub mod error;
pub mod models;
pub mod protocol;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{List, ListId, SyncStatus, Task, TaskId, User};
pub use store::LocalStore;
