//! Task service: the orchestration layer between the HTTP handlers, the
//! store gateway, and the cache layer.

pub mod service;

pub use service::{TaskList, TaskService};
