//! slate-server - Authoritative sync server for Slate
//!
//! Exposed as a library so integration tests can drive the reconciler
//! in-process; the binary in `main.rs` is a thin wrapper.

pub mod auth;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod routes;
pub mod store;
