//! Storage abstraction layer for the Tasktrack server.
//!
//! Defines the [`TaskStore`] and [`UserStore`] traits that all storage
//! backends implement, plus the [`StorageError`] type they speak.

pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::{TaskStore, UserStore};
