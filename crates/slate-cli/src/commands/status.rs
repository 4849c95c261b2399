use std::path::PathBuf;

use chrono::Utc;

use crate::commands::common::{format_relative_time, open_store};
use crate::error::CliError;
use crate::profile::Profile;

pub async fn run_status(db_path: Option<PathBuf>) -> Result<(), CliError> {
    let profile = Profile::load()?;
    let store = open_store(db_path)?;
    let status = store.status().await?;

    if profile.is_authenticated() {
        println!(
            "Logged in to {}",
            profile.api_base_url.as_deref().unwrap_or("(no server)")
        );
    } else {
        println!("Not logged in");
    }
    println!(
        "Pending: {} lists, {} tasks changed; {} lists, {} tasks deleted",
        status.dirty_lists, status.dirty_tasks, status.tombstoned_lists, status.tombstoned_tasks
    );
    match status.last_sync {
        Some(cursor) => println!(
            "Last sync: {}",
            format_relative_time(cursor, Utc::now().timestamp_millis())
        ),
        None => println!("Last sync: never"),
    }
    Ok(())
}
