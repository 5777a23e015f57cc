//! Owner-scoped task operations with cache-aware reads and
//! invalidate-on-write semantics.
//!
//! The one ordering rule every mutation follows: the durable write commits
//! first, then the owner's cache entry is dropped. A failed write leaves the
//! cache untouched — the existing snapshot still describes the true state.
//! Readers that race a mutation either miss (and fetch post-mutation state
//! from the store) or see a snapshot at most one TTL old.
//!
//! There is no cross-request locking. Two concurrent operations for the same
//! owner can interleave so that a read-through repopulates the cache from a
//! store read that started before a mutation committed, leaving a stale
//! entry behind until the next invalidation or TTL expiry. That window is an
//! accepted trade-off of this design, bounded by the 300-second TTL.

use std::sync::Arc;

use uuid::Uuid;

use tasktrack_core::{Task, TaskFields};
use tasktrack_storage::TaskStore;

use crate::cache::TaskListCache;
use crate::error::ApiError;

/// Result of a list read, tagged with where the data came from.
#[derive(Debug, Clone)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub from_cache: bool,
}

/// Orchestrates the store gateway and the cache layer.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    cache: TaskListCache,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, cache: TaskListCache) -> Self {
        Self { store, cache }
    }

    /// Read-through list: cache hit wins, a miss falls back to the store and
    /// repopulates the cache best-effort.
    pub async fn list(&self, owner: Uuid) -> Result<TaskList, ApiError> {
        if let Some(tasks) = self.cache.get(owner).await {
            return Ok(TaskList {
                tasks,
                from_cache: true,
            });
        }

        let tasks = self.store.list_by_owner(owner).await?;
        // Best-effort: the result is returned regardless of whether the
        // snapshot could be written.
        self.cache.set(owner, &tasks).await;

        Ok(TaskList {
            tasks,
            from_cache: false,
        })
    }

    /// Validates the fields, writes the task, then invalidates the owner's
    /// snapshot.
    pub async fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, ApiError> {
        let validated = fields.validate_for_create()?;
        let task = Task::new(owner, validated);

        let created = self.store.create(&task).await?;
        self.cache.invalidate(owner).await;

        Ok(created)
    }

    /// Partial update scoped by owner. A task that exists under another
    /// owner yields the same not-found as an absent one.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: TaskFields,
    ) -> Result<Task, ApiError> {
        let validated = fields.validate_partial()?;

        let mut task = self
            .store
            .find_by_owner(owner, id)
            .await?
            .ok_or_else(task_not_found)?;
        task.apply(validated);

        // The task can disappear between the read and the write; treat that
        // the same as never having found it.
        let updated = self
            .store
            .update(&task)
            .await?
            .ok_or_else(task_not_found)?;
        self.cache.invalidate(owner).await;

        Ok(updated)
    }

    /// Atomic find-and-delete scoped by owner. The cache is only touched
    /// when a record was actually removed.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Task, ApiError> {
        match self.store.delete_by_owner(owner, id).await? {
            Some(deleted) => {
                self.cache.invalidate(owner).await;
                Ok(deleted)
            }
            None => Err(task_not_found()),
        }
    }
}

fn task_not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, TaskListCache};
    use tasktrack_core::TaskStatus;
    use tasktrack_db_memory::InMemoryStorage;

    fn service() -> TaskService {
        TaskService::new(
            Arc::new(InMemoryStorage::new()),
            TaskListCache::new(CacheBackend::new_local()),
        )
    }

    fn title_fields(title: &str) -> TaskFields {
        TaskFields {
            title: Some(title.to_string()),
            ..TaskFields::default()
        }
    }

    #[tokio::test]
    async fn list_reports_cache_source_correctly() {
        let service = service();
        let owner = Uuid::new_v4();

        // First read populates, second is served from the snapshot.
        let first = service.list(owner).await.unwrap();
        assert!(!first.from_cache);
        let second = service.list(owner).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.tasks, first.tasks);
    }

    #[tokio::test]
    async fn create_invalidates_so_the_next_read_sees_the_task() {
        let service = service();
        let owner = Uuid::new_v4();

        // Warm the cache with the empty list.
        service.list(owner).await.unwrap();

        let task = service.create(owner, title_fields("Buy milk")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let list = service.list(owner).await.unwrap();
        assert!(!list.from_cache, "mutation must drop the snapshot");
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].id, task.id);

        // And the read-through repopulated it again.
        assert!(service.list(owner).await.unwrap().from_cache);
    }

    #[tokio::test]
    async fn update_applies_only_present_fields_and_invalidates() {
        let service = service();
        let owner = Uuid::new_v4();
        let task = service.create(owner, title_fields("Buy milk")).await.unwrap();
        service.list(owner).await.unwrap();

        let patch = TaskFields {
            status: Some("completed".to_string()),
            ..TaskFields::default()
        };
        let updated = service.update(owner, task.id, patch).await.unwrap();
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.status, TaskStatus::Completed);

        assert!(!service.list(owner).await.unwrap().from_cache);
    }

    #[tokio::test]
    async fn cross_owner_update_and_delete_are_not_found() {
        let service = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = service.create(alice, title_fields("private")).await.unwrap();

        let err = service
            .update(bob, task.id, title_fields("stolen"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = service.delete(bob, task.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // Alice's task is untouched.
        let list = service.list(alice).await.unwrap();
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].title, "private");
    }

    #[tokio::test]
    async fn failed_delete_leaves_the_cache_alone() {
        let service = service();
        let owner = Uuid::new_v4();
        service.create(owner, title_fields("keep me")).await.unwrap();
        service.list(owner).await.unwrap();

        let err = service.delete(owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // Not-found mutations never invalidate.
        assert!(service.list(owner).await.unwrap().from_cache);
    }

    #[tokio::test]
    async fn delete_then_list_is_empty_and_store_sourced() {
        let service = service();
        let owner = Uuid::new_v4();
        let task = service.create(owner, title_fields("ephemeral")).await.unwrap();
        service.list(owner).await.unwrap();

        service.delete(owner, task.id).await.unwrap();

        let list = service.list(owner).await.unwrap();
        assert!(!list.from_cache);
        assert!(list.tasks.is_empty());
    }

    #[tokio::test]
    async fn invalid_fields_reject_before_any_write() {
        let service = service();
        let owner = Uuid::new_v4();

        let err = service
            .create(owner, title_fields(&"x".repeat(201)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Nothing was stored and nothing invalidated: warm cache stays warm.
        service.list(owner).await.unwrap();
        assert!(service.list(owner).await.unwrap().from_cache);
        assert!(service.list(owner).await.unwrap().tasks.is_empty());
    }

    #[tokio::test]
    async fn unreachable_cache_store_degrades_to_store_reads() {
        // A Redis backend pointed at a port nothing listens on: every cache
        // operation degrades, every request is served from the store.
        let backend = CacheBackend::from_redis_url(
            "redis://127.0.0.1:6390",
            2,
            std::time::Duration::from_millis(200),
        );
        let service = TaskService::new(
            Arc::new(InMemoryStorage::new()),
            TaskListCache::new(backend),
        );
        let owner = Uuid::new_v4();

        let task = service.create(owner, title_fields("Buy milk")).await.unwrap();
        let first = service.list(owner).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.tasks.len(), 1);

        let second = service.list(owner).await.unwrap();
        assert!(!second.from_cache, "an unreachable cache never reports hits");

        service.delete(owner, task.id).await.unwrap();
        let third = service.list(owner).await.unwrap();
        assert!(!third.from_cache);
        assert!(third.tasks.is_empty());
    }
}
