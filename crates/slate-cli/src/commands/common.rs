//! Shared helpers for command handlers.

use std::env;
use std::path::PathBuf;

use slate_core::models::{List, ListId, Task, TaskId};
use slate_core::LocalStore;

use crate::error::CliError;

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("SLATE_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slate")
        .join("slate.db")
}

pub fn open_store(cli_db_path: Option<PathBuf>) -> Result<LocalStore, CliError> {
    Ok(LocalStore::open_path(resolve_db_path(cli_db_path))?)
}

/// Join word arguments into one name, rejecting blank input.
pub fn join_words(parts: &[String]) -> Result<String, CliError> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Find a list by exact id or unique id prefix.
pub async fn resolve_list(store: &LocalStore, query: &str) -> Result<List, CliError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<ListId>() {
        if let Some(list) = store.get_list(&id).await? {
            return Ok(list);
        }
    }

    let mut matches: Vec<List> = store
        .lists()
        .await?
        .into_iter()
        .filter(|list| list.id.as_str().starts_with(query))
        .collect();
    match matches.len() {
        0 => Err(CliError::ListNotFound(query.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(CliError::AmbiguousId(ambiguous_message(
            query,
            matches.iter().map(|list| list.id.as_str()),
        ))),
    }
}

/// Find a task by exact id or unique id prefix, searching every list.
pub async fn resolve_task(store: &LocalStore, query: &str) -> Result<Task, CliError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<TaskId>() {
        if let Some(task) = store.get_task(&id).await? {
            return Ok(task);
        }
    }

    let mut matches = Vec::new();
    for list in store.lists().await? {
        for task in store.tasks(&list.id).await? {
            if task.id.as_str().starts_with(query) {
                matches.push(task);
            }
        }
    }
    match matches.len() {
        0 => Err(CliError::TaskNotFound(query.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(CliError::AmbiguousId(ambiguous_message(
            query,
            matches.iter().map(|task| task.id.as_str()),
        ))),
    }
}

fn ambiguous_message(query: &str, ids: impl Iterator<Item = String>) -> String {
    let options = ids
        .take(3)
        .map(|id| short_id(&id))
        .collect::<Vec<_>>()
        .join(", ");
    format!("ID prefix '{query}' is ambiguous; matches: {options}")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn join_words_trims_and_rejects_blank() {
        assert_eq!(
            join_words(&["buy".to_string(), "milk".to_string()]).unwrap(),
            "buy milk"
        );
        assert!(matches!(
            join_words(&["  ".to_string()]),
            Err(CliError::EmptyName)
        ));
        assert!(matches!(join_words(&[]), Err(CliError::EmptyName)));
    }

    #[test]
    fn format_relative_time_units() {
        let now = 10_000_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
        assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    }

    #[tokio::test]
    async fn resolve_list_by_exact_id_and_prefix() {
        let store = LocalStore::open_in_memory().unwrap();
        let groceries = store.create_list("local", "Groceries", None).await.unwrap();
        let chores = store.create_list("local", "Chores", None).await.unwrap();

        let by_exact = resolve_list(&store, &groceries.id.as_str()).await.unwrap();
        assert_eq!(by_exact.name, "Groceries");

        // A v7 uuid prefix this long is unique between two ids.
        let prefix: String = chores.id.as_str().chars().take(16).collect();
        let by_prefix = resolve_list(&store, &prefix).await.unwrap();
        assert_eq!(by_prefix.name, "Chores");

        let missing = resolve_list(&store, "ffffffff").await.unwrap_err();
        assert!(matches!(missing, CliError::ListNotFound(_)));
    }

    #[tokio::test]
    async fn resolve_task_searches_across_lists() {
        let store = LocalStore::open_in_memory().unwrap();
        let groceries = store.create_list("local", "Groceries", None).await.unwrap();
        let chores = store.create_list("local", "Chores", None).await.unwrap();
        store
            .create_task(&groceries.id, "Milk", None, None)
            .await
            .unwrap();
        let sweep = store
            .create_task(&chores.id, "Sweep", None, None)
            .await
            .unwrap();

        let prefix: String = sweep.id.as_str().chars().take(16).collect();
        let found = resolve_task(&store, &prefix).await.unwrap();
        assert_eq!(found.title, "Sweep");

        let missing = resolve_task(&store, "ffffffff").await.unwrap_err();
        assert!(matches!(missing, CliError::TaskNotFound(_)));
    }
}
