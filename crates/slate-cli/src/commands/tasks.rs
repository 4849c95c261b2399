use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::commands::common::{
    format_relative_time, join_words, open_store, resolve_list, resolve_task, short_id,
};
use crate::error::CliError;

pub async fn run_add(
    list_query: &str,
    title_parts: &[String],
    description: Option<&str>,
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let title = join_words(title_parts)?;
    let store = open_store(db_path)?;
    let list = resolve_list(&store, list_query).await?;
    let task = store
        .create_task(&list.id, &title, description, None)
        .await?;
    println!("{}", task.id);
    Ok(())
}

#[derive(Debug, Serialize)]
struct TaskItem {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    updated_at: i64,
}

pub async fn run_ls(
    list_query: &str,
    as_json: bool,
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let list = resolve_list(&store, list_query).await?;
    let tasks = store.tasks(&list.id).await?;

    if as_json {
        let items: Vec<TaskItem> = tasks
            .iter()
            .map(|task| TaskItem {
                id: task.id.as_str(),
                title: task.title.clone(),
                description: task.description.clone(),
                completed: task.completed,
                updated_at: task.updated_at,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let now_ms = Utc::now().timestamp_millis();
        for task in &tasks {
            let marker = if task.completed { "[x]" } else { "[ ]" };
            println!(
                "{} {:<8}  {:<32}  {}",
                marker,
                short_id(&task.id.as_str()),
                task.title,
                format_relative_time(task.updated_at, now_ms)
            );
        }
    }
    Ok(())
}

pub async fn run_done(id: &str, undo: bool, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let task = resolve_task(&store, id).await?;
    let updated = store.set_task_completed(&task.id, !undo).await?;
    println!("{}", updated.id);
    Ok(())
}

pub async fn run_rm(id: &str, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let task = resolve_task(&store, id).await?;
    store.delete_task(&task.id).await?;
    println!("{}", task.id);
    Ok(())
}
