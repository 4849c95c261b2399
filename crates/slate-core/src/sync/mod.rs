//! Client-side sync engine: transport, coordinator, and scheduler.

mod coordinator;
mod http;
mod scheduler;

use std::future::Future;

use thiserror::Error;

pub use coordinator::{SyncCoordinator, SyncOutcome, SyncReport};
pub use http::HttpSyncClient;
pub use scheduler::SyncScheduler;

use crate::protocol::{
    FullSyncRequest, FullSyncResponse, PullRequest, PullResponse, PushRequest, PushResponse,
};

/// Errors from a sync round trip.
///
/// `Offline` and `Unauthenticated` are expected states, not faults: the
/// coordinator skips the cycle silently and the next tick retries.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network unavailable: {0}")]
    Offline(String),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Sync API error: {0}")]
    Api(String),
    #[error("Sync HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid sync configuration: {0}")]
    InvalidConfiguration(String),
}

/// How the coordinator reaches the server.
///
/// The HTTP client implements this for production; tests drive the
/// coordinator against in-process implementations.
pub trait SyncTransport: Send + Sync {
    /// Whether a bearer credential is available.
    fn is_authenticated(&self) -> bool;

    /// Send one batch of local changes.
    fn push(
        &self,
        request: PushRequest,
    ) -> impl Future<Output = Result<PushResponse, SyncError>> + Send;

    /// Request all server-side changes after the cursor.
    fn pull(
        &self,
        request: PullRequest,
    ) -> impl Future<Output = Result<PullResponse, SyncError>> + Send;

    /// Push and pull composed into one round trip.
    fn full_sync(
        &self,
        request: FullSyncRequest,
    ) -> impl Future<Output = Result<FullSyncResponse, SyncError>> + Send;
}
