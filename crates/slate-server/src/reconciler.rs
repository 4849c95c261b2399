//! Last-write-wins reconciliation of pushed batches and delta pulls.
//!
//! One push batch = one transaction: tombstones first, then list upserts,
//! then task upserts. Every comparison is whole-record against the stored
//! effective timestamp `max(updated_at, deleted_at)`, so an edit and a
//! delete of the same record resolve the same way regardless of which
//! device's batch arrives first.

use std::str::FromStr;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use slate_core::models::{List, ListId, SyncStatus, Task, TaskId};
use slate_core::protocol::{
    FullSyncRequest, FullSyncResponse, PullResponse, PushRequest, PushResponse, RecordOutcome,
    RecordResult, RejectReason, Tombstone,
};

use crate::error::AppError;
use crate::store::ServerDb;

#[derive(Clone)]
pub struct Reconciler {
    db: Arc<Mutex<ServerDb>>,
}

impl Reconciler {
    pub fn new(db: ServerDb) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Apply one pushed batch for `owner` atomically.
    pub async fn apply_push(
        &self,
        owner: &str,
        request: &PushRequest,
    ) -> Result<PushResponse, AppError> {
        let mut db = self.db.lock().await;
        let stamp = db.tick();
        let tx = db.connection().unchecked_transaction()?;

        for tombstone in &request.deleted_lists {
            apply_list_tombstone(&tx, owner, tombstone, stamp)?;
        }
        for tombstone in &request.deleted_tasks {
            apply_task_tombstone(&tx, owner, tombstone, stamp)?;
        }

        let mut list_results = Vec::with_capacity(request.lists.len());
        for list in &request.lists {
            list_results.push(RecordResult {
                id: list.id.as_str(),
                outcome: upsert_list(&tx, owner, list, stamp)?,
            });
        }
        let mut task_results = Vec::with_capacity(request.tasks.len());
        for task in &request.tasks {
            task_results.push(RecordResult {
                id: task.id.as_str(),
                outcome: upsert_task(&tx, owner, task, stamp)?,
            });
        }
        tx.commit()?;

        Ok(PushResponse {
            synced_lists: acknowledged(&list_results),
            synced_tasks: acknowledged(&task_results),
            deleted_lists: request.deleted_lists.len(),
            deleted_tasks: request.deleted_tasks.len(),
            list_results,
            task_results,
            server_time: stamp,
        })
    }

    /// Everything of `owner`'s that changed after the cursor, plus the next
    /// cursor. `None` means a full pull.
    pub async fn delta(&self, owner: &str, cursor: Option<i64>) -> Result<PullResponse, AppError> {
        let mut db = self.db.lock().await;
        let server_time = db.tick();
        let conn = db.connection();
        let cursor = cursor.unwrap_or(i64::MIN);

        let mut statement = conn.prepare(
            "SELECT id, owner_id, name, color, created_at, updated_at FROM lists
             WHERE owner_id = ?1 AND deleted_at IS NULL AND synced_at > ?2",
        )?;
        let lists = statement
            .query_map(params![owner, cursor], parse_list)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut statement = conn.prepare(
            "SELECT id, list_id, title, description, completed, reminder, position,
                    created_at, updated_at
             FROM tasks
             WHERE owner_id = ?1 AND deleted_at IS NULL AND synced_at > ?2",
        )?;
        let tasks = statement
            .query_map(params![owner, cursor], parse_task)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut statement = conn.prepare(
            "SELECT id FROM lists
             WHERE owner_id = ?1 AND deleted_at IS NOT NULL AND synced_at > ?2",
        )?;
        let deleted_list_ids = statement
            .query_map(params![owner, cursor], |row| {
                parse_id::<ListId>(row.get::<_, String>(0)?)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut statement = conn.prepare(
            "SELECT id FROM tasks
             WHERE owner_id = ?1 AND deleted_at IS NOT NULL AND synced_at > ?2",
        )?;
        let deleted_task_ids = statement
            .query_map(params![owner, cursor], |row| {
                parse_id::<TaskId>(row.get::<_, String>(0)?)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PullResponse {
            lists,
            tasks,
            deleted_list_ids,
            deleted_task_ids,
            server_time,
        })
    }

    /// Push and pull in one round trip, push first so the pull's cursor
    /// already covers the batch.
    pub async fn full_sync(
        &self,
        owner: &str,
        request: &FullSyncRequest,
    ) -> Result<FullSyncResponse, AppError> {
        let push = self.apply_push(owner, &request.push).await?;
        let pull = self.delta(owner, request.last_sync).await?;
        Ok(FullSyncResponse { push, pull })
    }
}

fn acknowledged(results: &[RecordResult]) -> usize {
    results
        .iter()
        .filter(|result| {
            matches!(
                result.outcome,
                RecordOutcome::Applied | RecordOutcome::Stale
            )
        })
        .count()
}

/// Stored LWW state of a row: who owns it and the effective timestamp a
/// newer write must beat.
struct StoredRow {
    owner_id: String,
    effective_at: i64,
}

fn stored_row(conn: &Connection, table: &str, id: &str) -> Result<Option<StoredRow>, AppError> {
    let sql = format!(
        "SELECT owner_id, MAX(updated_at, COALESCE(deleted_at, 0)) FROM {table} WHERE id = ?1"
    );
    Ok(conn
        .query_row(&sql, [id], |row| {
            Ok(StoredRow {
                owner_id: row.get(0)?,
                effective_at: row.get(1)?,
            })
        })
        .optional()?)
}

fn upsert_list(
    conn: &Connection,
    owner: &str,
    list: &List,
    stamp: i64,
) -> Result<RecordOutcome, AppError> {
    if list.name.trim().is_empty() {
        return Ok(RecordOutcome::Rejected(RejectReason::EmptyName));
    }
    let id = list.id.as_str();
    match stored_row(conn, "lists", &id)? {
        None => {
            conn.execute(
                "INSERT INTO lists (id, owner_id, name, color, created_at, updated_at, deleted_at, synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
                params![
                    id,
                    owner,
                    list.name,
                    list.color,
                    list.created_at,
                    list.updated_at,
                    stamp
                ],
            )?;
            Ok(RecordOutcome::Applied)
        }
        Some(stored) if stored.owner_id != owner => {
            Ok(RecordOutcome::Rejected(RejectReason::NotOwned))
        }
        Some(stored) if list.updated_at > stored.effective_at => {
            // Clearing deleted_at here is what resurrects a tombstoned
            // record when a strictly newer upsert arrives.
            conn.execute(
                "UPDATE lists
                 SET name = ?2, color = ?3, updated_at = ?4, deleted_at = NULL, synced_at = ?5
                 WHERE id = ?1",
                params![id, list.name, list.color, list.updated_at, stamp],
            )?;
            Ok(RecordOutcome::Applied)
        }
        Some(_) => Ok(RecordOutcome::Stale),
    }
}

fn upsert_task(
    conn: &Connection,
    owner: &str,
    task: &Task,
    stamp: i64,
) -> Result<RecordOutcome, AppError> {
    if task.title.trim().is_empty() {
        return Ok(RecordOutcome::Rejected(RejectReason::EmptyName));
    }
    let Some(list) = stored_list_state(conn, &task.list_id)? else {
        return Ok(RecordOutcome::Rejected(RejectReason::UnknownList));
    };
    if list.owner_id != owner {
        return Ok(RecordOutcome::Rejected(RejectReason::NotOwned));
    }
    if list.deleted {
        return Ok(RecordOutcome::Rejected(RejectReason::ListDeleted));
    }

    let id = task.id.as_str();
    match stored_row(conn, "tasks", &id)? {
        None => {
            conn.execute(
                "INSERT INTO tasks (id, list_id, owner_id, title, description, completed,
                                    reminder, position, created_at, updated_at, deleted_at, synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, ?11)",
                params![
                    id,
                    task.list_id.as_str(),
                    owner,
                    task.title,
                    task.description,
                    task.completed,
                    task.reminder,
                    task.position,
                    task.created_at,
                    task.updated_at,
                    stamp
                ],
            )?;
            Ok(RecordOutcome::Applied)
        }
        Some(stored) if stored.owner_id != owner => {
            Ok(RecordOutcome::Rejected(RejectReason::NotOwned))
        }
        Some(stored) if task.updated_at > stored.effective_at => {
            conn.execute(
                "UPDATE tasks
                 SET list_id = ?2, title = ?3, description = ?4, completed = ?5,
                     reminder = ?6, position = ?7, updated_at = ?8, deleted_at = NULL,
                     synced_at = ?9
                 WHERE id = ?1",
                params![
                    id,
                    task.list_id.as_str(),
                    task.title,
                    task.description,
                    task.completed,
                    task.reminder,
                    task.position,
                    task.updated_at,
                    stamp
                ],
            )?;
            Ok(RecordOutcome::Applied)
        }
        Some(_) => Ok(RecordOutcome::Stale),
    }
}

struct StoredListState {
    owner_id: String,
    deleted: bool,
}

fn stored_list_state(
    conn: &Connection,
    list_id: &ListId,
) -> Result<Option<StoredListState>, AppError> {
    Ok(conn
        .query_row(
            "SELECT owner_id, deleted_at IS NOT NULL FROM lists WHERE id = ?1",
            [list_id.as_str()],
            |row| {
                Ok(StoredListState {
                    owner_id: row.get(0)?,
                    deleted: row.get(1)?,
                })
            },
        )
        .optional()?)
}

fn apply_list_tombstone(
    conn: &Connection,
    owner: &str,
    tombstone: &Tombstone<ListId>,
    stamp: i64,
) -> Result<(), AppError> {
    let id = tombstone.id.as_str();
    match stored_row(conn, "lists", &id)? {
        None => {
            // Never-seen id: store the tombstone anyway so a slower device's
            // older upsert of the same record still loses the comparison.
            conn.execute(
                "INSERT INTO lists (id, owner_id, name, color, created_at, updated_at, deleted_at, synced_at)
                 VALUES (?1, ?2, '', '', ?3, ?3, ?3, ?4)",
                params![id, owner, tombstone.deleted_at, stamp],
            )?;
        }
        Some(stored) if stored.owner_id != owner => {
            tracing::warn!(id = %id, "ignoring tombstone for record owned by another user");
        }
        Some(stored) if tombstone.deleted_at > stored.effective_at => {
            conn.execute(
                "UPDATE lists SET deleted_at = ?2, synced_at = ?3 WHERE id = ?1",
                params![id, tombstone.deleted_at, stamp],
            )?;
            // Cascade to live tasks; each gets an effective timestamp past
            // its own updated_at so the tombstone wins on every device.
            conn.execute(
                "UPDATE tasks SET deleted_at = MAX(updated_at + 1, ?2), synced_at = ?3
                 WHERE list_id = ?1 AND owner_id = ?4 AND deleted_at IS NULL",
                params![id, tombstone.deleted_at, stamp, owner],
            )?;
        }
        Some(_) => {} // stale delete, a newer write already superseded it
    }
    Ok(())
}

fn apply_task_tombstone(
    conn: &Connection,
    owner: &str,
    tombstone: &Tombstone<TaskId>,
    stamp: i64,
) -> Result<(), AppError> {
    let id = tombstone.id.as_str();
    match stored_row(conn, "tasks", &id)? {
        None => {
            // List linkage is unknown for a never-seen id; tombstoned rows
            // only ever surface as deleted ids, so an empty link is fine.
            conn.execute(
                "INSERT INTO tasks (id, list_id, owner_id, title, created_at, updated_at, deleted_at, synced_at)
                 VALUES (?1, '', ?2, '', ?3, ?3, ?3, ?4)",
                params![id, owner, tombstone.deleted_at, stamp],
            )?;
        }
        Some(stored) if stored.owner_id != owner => {
            tracing::warn!(id = %id, "ignoring tombstone for record owned by another user");
        }
        Some(stored) if tombstone.deleted_at > stored.effective_at => {
            conn.execute(
                "UPDATE tasks SET deleted_at = ?2, synced_at = ?3 WHERE id = ?1",
                params![id, tombstone.deleted_at, stamp],
            )?;
        }
        Some(_) => {}
    }
    Ok(())
}

fn parse_list(row: &rusqlite::Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: parse_id(row.get::<_, String>(0)?)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        sync_status: SyncStatus::Clean,
    })
}

fn parse_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_id(row.get::<_, String>(0)?)?,
        list_id: parse_id(row.get::<_, String>(1)?)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        reminder: row.get(5)?,
        position: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        sync_status: SyncStatus::Clean,
    })
}

fn parse_id<T>(value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|error: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ALICE: &str = "user-alice";
    const BOB: &str = "user-bob";

    fn reconciler() -> Reconciler {
        Reconciler::new(ServerDb::open_in_memory().unwrap())
    }

    fn list(owner: &str, name: &str, updated_at: i64) -> List {
        let mut list = List::new(owner, name, None);
        list.updated_at = updated_at;
        list.created_at = updated_at;
        list
    }

    fn task(list_id: ListId, title: &str, updated_at: i64) -> Task {
        let mut task = Task::new(list_id, title);
        task.updated_at = updated_at;
        task.created_at = updated_at;
        task
    }

    fn push_lists(lists: Vec<List>) -> PushRequest {
        PushRequest {
            lists,
            ..PushRequest::default()
        }
    }

    #[tokio::test]
    async fn newer_upsert_replaces_older_is_discarded() {
        let reconciler = reconciler();
        let mut groceries = list(ALICE, "Groceries", 100);
        let id = groceries.id;

        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![groceries.clone()]))
            .await
            .unwrap();
        assert_eq!(response.list_results[0].outcome, RecordOutcome::Applied);

        // Strictly newer edit wins.
        groceries.name = "Groceries v2".to_string();
        groceries.updated_at = 200;
        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![groceries.clone()]))
            .await
            .unwrap();
        assert_eq!(response.list_results[0].outcome, RecordOutcome::Applied);

        // Older concurrent edit is discarded without error.
        groceries.name = "Groceries stale".to_string();
        groceries.updated_at = 150;
        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![groceries]))
            .await
            .unwrap();
        assert_eq!(response.list_results[0].outcome, RecordOutcome::Stale);
        assert_eq!(response.synced_lists, 1);

        let pull = reconciler.delta(ALICE, None).await.unwrap();
        assert_eq!(pull.lists.len(), 1);
        assert_eq!(pull.lists[0].id, id);
        assert_eq!(pull.lists[0].name, "Groceries v2");
        assert_eq!(pull.lists[0].updated_at, 200);
    }

    #[tokio::test]
    async fn replaying_an_unchanged_batch_returns_identical_counts() {
        let reconciler = reconciler();
        let groceries = list(ALICE, "Groceries", 100);
        let chores = task(groceries.id, "Sweep", 110);
        let request = PushRequest {
            lists: vec![groceries],
            tasks: vec![chores],
            ..PushRequest::default()
        };

        let first = reconciler.apply_push(ALICE, &request).await.unwrap();
        let second = reconciler.apply_push(ALICE, &request).await.unwrap();

        assert_eq!(first.synced_lists, 1);
        assert_eq!(first.synced_tasks, 1);
        assert_eq!(second.synced_lists, first.synced_lists);
        assert_eq!(second.synced_tasks, first.synced_tasks);
        // The replay is acknowledged as stale, not re-applied.
        assert_eq!(second.list_results[0].outcome, RecordOutcome::Stale);
        assert_eq!(second.task_results[0].outcome, RecordOutcome::Stale);
    }

    #[tokio::test]
    async fn list_tombstone_cascades_to_all_tasks() {
        let reconciler = reconciler();
        let groceries = list(ALICE, "Groceries", 100);
        let list_id = groceries.id;
        let tasks: Vec<Task> = (0..5)
            .map(|i| task(list_id, &format!("item {i}"), 110 + i))
            .collect();
        reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    lists: vec![groceries],
                    tasks,
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();

        let response = reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    deleted_lists: vec![Tombstone {
                        id: list_id,
                        deleted_at: 300,
                    }],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.deleted_lists, 1);

        // Another device pulling from scratch sees only deletions.
        let pull = reconciler.delta(ALICE, None).await.unwrap();
        assert!(pull.lists.is_empty());
        assert!(pull.tasks.is_empty());
        assert_eq!(pull.deleted_list_ids, vec![list_id]);
        assert_eq!(pull.deleted_task_ids.len(), 5);
    }

    #[tokio::test]
    async fn newer_upsert_resurrects_a_tombstoned_record() {
        let reconciler = reconciler();
        let mut groceries = list(ALICE, "Groceries", 100);
        let id = groceries.id;
        reconciler
            .apply_push(ALICE, &push_lists(vec![groceries.clone()]))
            .await
            .unwrap();
        reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    deleted_lists: vec![Tombstone {
                        id,
                        deleted_at: 200,
                    }],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();

        groceries.updated_at = 300;
        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![groceries]))
            .await
            .unwrap();
        assert_eq!(response.list_results[0].outcome, RecordOutcome::Applied);

        let pull = reconciler.delta(ALICE, None).await.unwrap();
        assert_eq!(pull.lists.len(), 1);
        assert_eq!(pull.lists[0].id, id);
        assert!(pull.deleted_list_ids.is_empty());
    }

    #[tokio::test]
    async fn edit_beats_older_delete_in_both_arrival_orders() {
        for delete_first in [true, false] {
            let reconciler = reconciler();
            let mut groceries = list(ALICE, "Groceries", 100);
            let id = groceries.id;
            reconciler
                .apply_push(ALICE, &push_lists(vec![groceries.clone()]))
                .await
                .unwrap();

            // Delete at 150, edit at 200; the edit must survive either way.
            groceries.name = "Groceries kept".to_string();
            groceries.updated_at = 200;
            let delete = PushRequest {
                deleted_lists: vec![Tombstone {
                    id,
                    deleted_at: 150,
                }],
                ..PushRequest::default()
            };
            let edit = push_lists(vec![groceries]);
            if delete_first {
                reconciler.apply_push(ALICE, &delete).await.unwrap();
                reconciler.apply_push(ALICE, &edit).await.unwrap();
            } else {
                reconciler.apply_push(ALICE, &edit).await.unwrap();
                reconciler.apply_push(ALICE, &delete).await.unwrap();
            }

            let pull = reconciler.delta(ALICE, None).await.unwrap();
            assert_eq!(pull.lists.len(), 1, "delete_first = {delete_first}");
            assert_eq!(pull.lists[0].name, "Groceries kept");
            assert!(pull.deleted_list_ids.is_empty());
        }
    }

    #[tokio::test]
    async fn tombstone_for_a_never_seen_id_still_blocks_older_upserts() {
        let reconciler = reconciler();
        let groceries = list(ALICE, "Groceries", 100);
        let id = groceries.id;

        reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    deleted_lists: vec![Tombstone {
                        id,
                        deleted_at: 150,
                    }],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();

        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![groceries]))
            .await
            .unwrap();
        assert_eq!(response.list_results[0].outcome, RecordOutcome::Stale);

        let pull = reconciler.delta(ALICE, None).await.unwrap();
        assert!(pull.lists.is_empty());
        assert_eq!(pull.deleted_list_ids, vec![id]);
    }

    #[tokio::test]
    async fn rejects_carry_the_reason() {
        let reconciler = reconciler();

        // Empty name.
        let response = reconciler
            .apply_push(ALICE, &push_lists(vec![list(ALICE, "  ", 100)]))
            .await
            .unwrap();
        assert_eq!(
            response.list_results[0].outcome,
            RecordOutcome::Rejected(RejectReason::EmptyName)
        );
        assert_eq!(response.synced_lists, 0);

        // Task against a list the server has never seen.
        let orphan = task(ListId::new(), "orphan", 100);
        let response = reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    tasks: vec![orphan],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            response.task_results[0].outcome,
            RecordOutcome::Rejected(RejectReason::UnknownList)
        );

        // Task against a tombstoned list.
        let groceries = list(ALICE, "Groceries", 100);
        let list_id = groceries.id;
        reconciler
            .apply_push(ALICE, &push_lists(vec![groceries]))
            .await
            .unwrap();
        reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    deleted_lists: vec![Tombstone {
                        id: list_id,
                        deleted_at: 200,
                    }],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        let late = task(list_id, "too late", 300);
        let response = reconciler
            .apply_push(
                ALICE,
                &PushRequest {
                    tasks: vec![late],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            response.task_results[0].outcome,
            RecordOutcome::Rejected(RejectReason::ListDeleted)
        );
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_owner() {
        let reconciler = reconciler();
        let groceries = list(ALICE, "Groceries", 100);
        let list_id = groceries.id;
        reconciler
            .apply_push(ALICE, &push_lists(vec![groceries.clone()]))
            .await
            .unwrap();

        // Bob cannot see, overwrite, attach to, or delete Alice's records.
        let pull = reconciler.delta(BOB, None).await.unwrap();
        assert!(pull.lists.is_empty());
        assert!(pull.deleted_list_ids.is_empty());

        let mut stolen = groceries;
        stolen.updated_at = 999;
        let response = reconciler
            .apply_push(BOB, &push_lists(vec![stolen]))
            .await
            .unwrap();
        assert_eq!(
            response.list_results[0].outcome,
            RecordOutcome::Rejected(RejectReason::NotOwned)
        );

        let intruder = task(list_id, "intrude", 100);
        let response = reconciler
            .apply_push(
                BOB,
                &PushRequest {
                    tasks: vec![intruder],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            response.task_results[0].outcome,
            RecordOutcome::Rejected(RejectReason::NotOwned)
        );

        reconciler
            .apply_push(
                BOB,
                &PushRequest {
                    deleted_lists: vec![Tombstone {
                        id: list_id,
                        deleted_at: 999,
                    }],
                    ..PushRequest::default()
                },
            )
            .await
            .unwrap();
        let pull = reconciler.delta(ALICE, None).await.unwrap();
        assert_eq!(pull.lists.len(), 1, "Alice's list must survive");
    }

    #[tokio::test]
    async fn pull_after_cursor_with_no_writes_is_empty() {
        let reconciler = reconciler();
        reconciler
            .apply_push(ALICE, &push_lists(vec![list(ALICE, "Groceries", 100)]))
            .await
            .unwrap();

        let first = reconciler.delta(ALICE, None).await.unwrap();
        assert_eq!(first.lists.len(), 1);

        let second = reconciler
            .delta(ALICE, Some(first.server_time))
            .await
            .unwrap();
        assert!(second.lists.is_empty());
        assert!(second.tasks.is_empty());
        assert!(second.deleted_list_ids.is_empty());
        assert!(second.deleted_task_ids.is_empty());
        assert!(second.server_time > first.server_time);
    }

    #[tokio::test]
    async fn delta_returns_only_records_past_the_cursor() {
        let reconciler = reconciler();
        reconciler
            .apply_push(ALICE, &push_lists(vec![list(ALICE, "First", 100)]))
            .await
            .unwrap();
        let checkpoint = reconciler.delta(ALICE, None).await.unwrap();

        let later = list(ALICE, "Second", 200);
        let later_id = later.id;
        reconciler
            .apply_push(ALICE, &push_lists(vec![later]))
            .await
            .unwrap();

        let pull = reconciler
            .delta(ALICE, Some(checkpoint.server_time))
            .await
            .unwrap();
        assert_eq!(pull.lists.len(), 1);
        assert_eq!(pull.lists[0].id, later_id);
    }

    #[tokio::test]
    async fn full_sync_matches_push_then_pull() {
        let reconciler = reconciler();
        let groceries = list(ALICE, "Groceries", 100);
        let id = groceries.id;

        let response = reconciler
            .full_sync(
                ALICE,
                &FullSyncRequest {
                    push: push_lists(vec![groceries]),
                    last_sync: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.push.synced_lists, 1);
        // The pull cursor predates the push, so the pushed record comes
        // straight back, exactly like discrete push-then-pull.
        assert_eq!(response.pull.lists.len(), 1);
        assert_eq!(response.pull.lists[0].id, id);
        assert!(response.pull.server_time > response.push.server_time);
    }
}
