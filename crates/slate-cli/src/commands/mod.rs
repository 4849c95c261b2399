pub mod common;
pub mod lists;
pub mod session;
pub mod status;
pub mod sync;
pub mod tasks;
