//! Book order service: an HTTP endpoint to list, create, update and cancel
//! book orders held in a process-scoped in-memory store.

pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
