use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::commands::common::{
    format_relative_time, join_words, open_store, resolve_list, short_id,
};
use crate::error::CliError;
use crate::profile::Profile;

pub async fn run_add(
    name_parts: &[String],
    color: Option<&str>,
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let name = join_words(name_parts)?;
    let profile = Profile::load()?;
    let store = open_store(db_path)?;
    let list = store.create_list(&profile.owner_id(), &name, color).await?;
    println!("{}", list.id);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ListItem {
    id: String,
    name: String,
    color: String,
    open_tasks: usize,
    updated_at: i64,
}

pub async fn run_ls(as_json: bool, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let lists = store.lists().await?;

    let mut items = Vec::with_capacity(lists.len());
    for list in &lists {
        let tasks = store.tasks(&list.id).await?;
        items.push(ListItem {
            id: list.id.as_str(),
            name: list.name.clone(),
            color: list.color.clone(),
            open_tasks: tasks.iter().filter(|task| !task.completed).count(),
            updated_at: list.updated_at,
        });
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let now_ms = Utc::now().timestamp_millis();
        for item in &items {
            println!(
                "{:<8}  {:<24}  {:>3} open  {}",
                short_id(&item.id),
                item.name,
                item.open_tasks,
                format_relative_time(item.updated_at, now_ms)
            );
        }
    }
    Ok(())
}

pub async fn run_rename(
    id: &str,
    name_parts: &[String],
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let name = join_words(name_parts)?;
    let store = open_store(db_path)?;
    let list = resolve_list(&store, id).await?;
    let updated = store.update_list(&list.id, Some(&name), None).await?;
    println!("{}", updated.id);
    Ok(())
}

pub async fn run_rm(id: &str, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let list = resolve_list(&store, id).await?;
    store.delete_list(&list.id).await?;
    println!("{}", list.id);
    Ok(())
}
