use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] slate_core::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Not logged in. Run `slate login --api-url <URL> --token <TOKEN>` first.")]
    NotLoggedIn,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("List not found for id/prefix: {0}")]
    ListNotFound(String),
    #[error("Task not found for id/prefix: {0}")]
    TaskNotFound(String),
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Profile error: {0}")]
    Profile(String),
}
