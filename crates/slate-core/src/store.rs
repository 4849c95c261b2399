//! Thread-safe local store shared across clients.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    Database, ListRepository, MetaRepository, SqliteListRepository, SqliteMetaRepository,
    SqliteTaskRepository, TaskRepository,
};
use crate::error::Result;
use crate::models::{List, ListId, Task, TaskId};
use crate::protocol::{PullResponse, PushRequest};

/// A snapshot of everything dirty or tombstoned at push time.
///
/// The acknowledgment steps (mark synced, purge) are keyed on the exact
/// `(id, updated_at)` pairs captured here, never on the live flags, so a
/// record mutated mid-flight stays dirty.
#[derive(Debug, Clone, Default)]
pub struct PushBatch {
    pub request: PushRequest,
    list_snapshot: Vec<(ListId, i64)>,
    task_snapshot: Vec<(TaskId, i64)>,
}

impl PushBatch {
    /// True when there is nothing to push.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.request.is_empty()
    }
}

/// Counters shown by client status surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub dirty_lists: usize,
    pub dirty_tasks: usize,
    pub tombstoned_lists: usize,
    pub tombstoned_tasks: usize,
    pub last_sync: Option<i64>,
}

/// Async facade over the local database and its repositories.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
}

impl LocalStore {
    /// Open a store at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db = Database::open(db_path.into())?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Arc::new(Mutex::new(Database::open_in_memory()?)),
        })
    }

    /// Create a new list.
    pub async fn create_list(
        &self,
        owner_id: &str,
        name: &str,
        color: Option<&str>,
    ) -> Result<List> {
        let list = List::new(owner_id, name, color);
        let db = self.db.lock().await;
        SqliteListRepository::new(db.connection()).insert(&list)?;
        Ok(list)
    }

    /// All non-tombstoned lists.
    pub async fn lists(&self) -> Result<Vec<List>> {
        let db = self.db.lock().await;
        SqliteListRepository::new(db.connection()).list()
    }

    /// Fetch a list by id.
    pub async fn get_list(&self, id: &ListId) -> Result<Option<List>> {
        let db = self.db.lock().await;
        SqliteListRepository::new(db.connection()).get(id)
    }

    /// Rename and/or recolor a list.
    pub async fn update_list(
        &self,
        id: &ListId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<List> {
        let db = self.db.lock().await;
        let repo = SqliteListRepository::new(db.connection());
        let mut list = repo
            .get(id)?
            .ok_or_else(|| crate::Error::NotFound(id.to_string()))?;
        if let Some(name) = name {
            list.name = name.to_string();
        }
        if let Some(color) = color {
            list.color = color.to_string();
        }
        list.touch();
        repo.update(&list)?;
        Ok(list)
    }

    /// Tombstone a list (cascades to its tasks locally).
    pub async fn delete_list(&self, id: &ListId) -> Result<()> {
        let db = self.db.lock().await;
        SqliteListRepository::new(db.connection()).delete(id)
    }

    /// Create a new task in a list.
    pub async fn create_task(
        &self,
        list_id: &ListId,
        title: &str,
        description: Option<&str>,
        reminder: Option<i64>,
    ) -> Result<Task> {
        let db = self.db.lock().await;
        let lists = SqliteListRepository::new(db.connection());
        if lists.get(list_id)?.is_none() {
            return Err(crate::Error::NotFound(list_id.to_string()));
        }

        let mut task = Task::new(*list_id, title);
        task.description = description.map(ToString::to_string);
        task.reminder = reminder;
        SqliteTaskRepository::new(db.connection()).insert(&task)?;
        Ok(task)
    }

    /// Non-tombstoned tasks of a list.
    pub async fn tasks(&self, list_id: &ListId) -> Result<Vec<Task>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_for(list_id)
    }

    /// Fetch a task by id.
    pub async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).get(id)
    }

    /// Set a task's completion state.
    pub async fn set_task_completed(&self, id: &TaskId, completed: bool) -> Result<Task> {
        let db = self.db.lock().await;
        let repo = SqliteTaskRepository::new(db.connection());
        let mut task = repo
            .get(id)?
            .ok_or_else(|| crate::Error::NotFound(id.to_string()))?;
        task.completed = completed;
        task.touch();
        repo.update(&task)?;
        Ok(task)
    }

    /// Edit a task's fields.
    pub async fn update_task(
        &self,
        id: &TaskId,
        title: Option<&str>,
        description: Option<&str>,
        reminder: Option<i64>,
        position: Option<i64>,
    ) -> Result<Task> {
        let db = self.db.lock().await;
        let repo = SqliteTaskRepository::new(db.connection());
        let mut task = repo
            .get(id)?
            .ok_or_else(|| crate::Error::NotFound(id.to_string()))?;
        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(description) = description {
            task.description = Some(description.to_string());
        }
        if let Some(reminder) = reminder {
            task.reminder = Some(reminder);
        }
        if let Some(position) = position {
            task.position = position;
        }
        task.touch();
        repo.update(&task)?;
        Ok(task)
    }

    /// Tombstone a task.
    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).delete(id)
    }

    /// Snapshot everything dirty or tombstoned as one push batch.
    pub async fn collect_batch(&self) -> Result<PushBatch> {
        let db = self.db.lock().await;
        let lists = SqliteListRepository::new(db.connection());
        let tasks = SqliteTaskRepository::new(db.connection());

        let dirty_lists = lists.dirty()?;
        let dirty_tasks = tasks.dirty()?;
        let list_snapshot = dirty_lists.iter().map(|l| (l.id, l.updated_at)).collect();
        let task_snapshot = dirty_tasks.iter().map(|t| (t.id, t.updated_at)).collect();

        Ok(PushBatch {
            request: PushRequest {
                lists: dirty_lists,
                tasks: dirty_tasks,
                deleted_lists: lists.tombstones()?,
                deleted_tasks: tasks.tombstones()?,
            },
            list_snapshot,
            task_snapshot,
        })
    }

    /// Acknowledge a successfully pushed batch: clear the dirty flag for the
    /// snapshotted records and physically purge the acknowledged tombstones.
    pub async fn mark_batch_synced(&self, batch: &PushBatch) -> Result<()> {
        let db = self.db.lock().await;
        let tx = db.connection().unchecked_transaction()?;

        let lists = SqliteListRepository::new(&tx);
        let tasks = SqliteTaskRepository::new(&tx);
        lists.mark_synced(&batch.list_snapshot)?;
        tasks.mark_synced(&batch.task_snapshot)?;

        let list_ids: Vec<ListId> = batch.request.deleted_lists.iter().map(|t| t.id).collect();
        let task_ids: Vec<TaskId> = batch.request.deleted_tasks.iter().map(|t| t.id).collect();
        tasks.purge(&task_ids)?;
        lists.purge(&list_ids)?;

        tx.commit()?;
        Ok(())
    }

    /// Merge a pull response: unconditional upserts (the server has already
    /// resolved conflicts) and physical deletes, in one transaction.
    pub async fn apply_pull(&self, response: &PullResponse) -> Result<()> {
        let db = self.db.lock().await;
        let tx = db.connection().unchecked_transaction()?;

        let lists = SqliteListRepository::new(&tx);
        let tasks = SqliteTaskRepository::new(&tx);

        for list in &response.lists {
            lists.apply_remote(list)?;
        }
        for task in &response.tasks {
            tasks.apply_remote(task)?;
        }
        for id in &response.deleted_task_ids {
            tasks.remove(id)?;
        }
        for id in &response.deleted_list_ids {
            lists.remove(id)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// The cursor from the last completed pull.
    pub async fn last_sync(&self) -> Result<Option<i64>> {
        let db = self.db.lock().await;
        SqliteMetaRepository::new(db.connection()).last_sync()
    }

    /// Advance the cursor to the server-reported pull time.
    pub async fn set_last_sync(&self, server_time: i64) -> Result<()> {
        let db = self.db.lock().await;
        SqliteMetaRepository::new(db.connection()).set_last_sync(server_time)
    }

    /// Forget the cursor so the next sync pulls the full account state.
    /// Used on logout; a later login may belong to a different account.
    pub async fn clear_last_sync(&self) -> Result<()> {
        let db = self.db.lock().await;
        SqliteMetaRepository::new(db.connection()).clear_last_sync()
    }

    /// Dirty/tombstone counters plus the current cursor.
    pub async fn status(&self) -> Result<StoreStatus> {
        let db = self.db.lock().await;
        let lists = SqliteListRepository::new(db.connection());
        let tasks = SqliteTaskRepository::new(db.connection());
        let meta = SqliteMetaRepository::new(db.connection());

        Ok(StoreStatus {
            dirty_lists: lists.dirty()?.len(),
            dirty_tasks: tasks.dirty()?.len(),
            tombstoned_lists: lists.tombstones()?.len(),
            tombstoned_tasks: tasks.tombstones()?.len(),
            last_sync: meta.last_sync()?,
        })
    }
}
