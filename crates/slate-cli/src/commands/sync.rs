use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use slate_core::sync::{HttpSyncClient, SyncCoordinator, SyncOutcome, SyncReport, SyncScheduler};

use crate::commands::common::open_store;
use crate::error::CliError;
use crate::profile::Profile;

pub async fn run_sync(
    full: bool,
    watch: bool,
    interval_secs: u64,
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let profile = Profile::load()?;
    let Some(base_url) = profile.api_base_url.clone() else {
        return Err(CliError::NotLoggedIn);
    };
    let transport = HttpSyncClient::new(base_url, profile.token.clone())
        .map_err(slate_core::Error::Sync)?;
    let store = open_store(db_path)?;
    let coordinator = SyncCoordinator::new(store, transport);

    if watch {
        let coordinator = Arc::new(coordinator);
        let scheduler =
            SyncScheduler::start(coordinator, Duration::from_secs(interval_secs.max(1)));
        println!("Watching for changes every {interval_secs}s; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        scheduler.stop().await;
        println!("Stopped");
        return Ok(());
    }

    let outcome = if full {
        coordinator.run_full().await?
    } else {
        coordinator.run().await?
    };
    match outcome {
        SyncOutcome::Completed(report) => {
            println!("{}", sync_summary(&report));
            if report.rejected_records > 0 {
                tracing::warn!(
                    rejected = report.rejected_records,
                    "server rejected records; they were acknowledged locally"
                );
            }
        }
        SyncOutcome::SkippedOffline => println!("Offline; changes are kept for the next sync"),
        SyncOutcome::SkippedUnauthenticated => return Err(CliError::NotLoggedIn),
        SyncOutcome::AlreadyRunning => println!("A sync is already running"),
    }
    Ok(())
}

fn sync_summary(report: &SyncReport) -> String {
    format!(
        "Synced: pushed {} lists, {} tasks, {} deletions; pulled {} lists, {} tasks, {} removals",
        report.pushed_lists,
        report.pushed_tasks,
        report.pushed_tombstones,
        report.pulled_lists,
        report.pulled_tasks,
        report.removed_records
    )
}
