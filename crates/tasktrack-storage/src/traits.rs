//! Storage traits for the Tasktrack storage abstraction layer.
//!
//! These traits are the only surface the task service and auth layer see;
//! backends (in-memory, MongoDB) implement them. Implementations must be
//! thread-safe (`Send + Sync`).

use async_trait::async_trait;
use uuid::Uuid;

use tasktrack_core::{Task, User};

use crate::error::StorageError;

/// Durable CRUD over [`Task`] records, always scoped by owner.
///
/// Every read and mutation takes the owner identity; a task that exists but
/// belongs to a different owner is indistinguishable from an absent one at
/// this layer.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a task with the same ID exists.
    async fn create(&self, task: &Task) -> Result<Task, StorageError>;

    /// Lists all tasks owned by `owner`, ordered by creation time descending.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues; an owner with no
    /// tasks yields an empty list.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, StorageError>;

    /// Reads a single task scoped by owner and id.
    ///
    /// Returns `None` if no task matches both.
    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError>;

    /// Replaces the stored task matching `task.id` *and* `task.owner`.
    ///
    /// Returns `None` if no task matches both — callers treat that as
    /// not-found, never as a permission failure.
    async fn update(&self, task: &Task) -> Result<Option<Task>, StorageError>;

    /// Deletes the task scoped by owner and id in a single find-and-delete
    /// operation, returning the deleted task.
    ///
    /// The lookup and the removal must not be separate round-trips; a race
    /// between an existence check and a delete would let two concurrent
    /// deletes both report success.
    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Durable CRUD over [`User`] records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the email is already
    /// registered.
    async fn create_user(&self, user: &User) -> Result<User, StorageError>;

    /// Looks a user up by normalized (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Looks a user up by id. Used by the auth middleware to confirm the
    /// token subject still exists.
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError>;
}
