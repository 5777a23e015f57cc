//! Core domain types and validation for the Tasktrack server.
//!
//! This crate is dependency-light on purpose: it defines the [`Task`] and
//! [`User`] models, their wire representation, and the field validation
//! rules every entry point must enforce before touching storage.

pub mod error;
pub mod task;
pub mod user;

pub use error::{CoreError, Result};
pub use task::{
    DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS, Task, TaskFields, TaskStatus, ValidatedTaskFields,
    parse_due_date, validate_description, validate_title,
};
pub use user::{
    NAME_MAX_CHARS, NAME_MIN_CHARS, PASSWORD_MIN_CHARS, User, validate_email, validate_name,
    validate_password,
};
