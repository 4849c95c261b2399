//! Record models shared by the local store, the wire protocol, and the server.

mod list;
mod status;
mod task;
mod user;

pub use list::{List, ListId, DEFAULT_LIST_COLOR};
pub use status::SyncStatus;
pub use task::{Task, TaskId};
pub use user::User;
