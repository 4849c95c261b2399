//! Background timer that drives periodic sync cycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{SyncCoordinator, SyncTransport};

/// Periodically invokes a coordinator until stopped.
///
/// One cycle runs immediately on start; the interval re-arms only after the
/// previous cycle returns, so a slow server cannot pile up ticks. Failed or
/// skipped cycles are logged and the timer keeps going.
pub struct SyncScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawn the scheduler loop on the current runtime.
    pub fn start<T>(coordinator: Arc<SyncCoordinator<T>>, interval: Duration) -> Self
    where
        T: SyncTransport + 'static,
    {
        let (shutdown, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            loop {
                match coordinator.run().await {
                    Ok(outcome) => tracing::debug!(?outcome, "scheduled sync finished"),
                    Err(error) => tracing::warn!("scheduled sync failed: {error}"),
                }
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    _ = stopped.changed() => {
                        tracing::debug!("sync scheduler stopping");
                        return;
                    }
                }
            }
        });
        Self { shutdown, handle }
    }

    /// Signal shutdown and wait for the loop to exit.
    ///
    /// A cycle already in flight runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
