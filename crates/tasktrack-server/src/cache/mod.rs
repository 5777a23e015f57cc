//! Read-through cache of per-owner task lists.
//!
//! One entry per owner under `tasks:{ownerId}`, holding the serialized task
//! list exactly as the list endpoint returns it, with a fixed 300-second
//! TTL. Entries are written lazily on a list-read miss and deleted eagerly
//! after every mutation; nothing else touches them.

pub mod backend;

use std::time::Duration;

use uuid::Uuid;

use tasktrack_core::Task;

pub use backend::{CACHE_OP_TIMEOUT, CacheBackend, CachedEntry};

/// Fixed lifetime of a task-list snapshot.
pub const TASK_LIST_TTL: Duration = Duration::from_secs(300);

/// Cache key for an owner's task list.
pub fn task_list_key(owner: Uuid) -> String {
    format!("tasks:{owner}")
}

/// The cache layer the task service talks to. Owns the key scheme, the JSON
/// codec, and the TTL; delegates storage to the injected [`CacheBackend`].
#[derive(Clone)]
pub struct TaskListCache {
    backend: CacheBackend,
    ttl: Duration,
}

impl TaskListCache {
    pub fn new(backend: CacheBackend) -> Self {
        Self {
            backend,
            ttl: TASK_LIST_TTL,
        }
    }

    /// Override the TTL. Test hook; production always uses [`TASK_LIST_TTL`].
    pub fn with_ttl(backend: CacheBackend, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Returns the cached task list for `owner`, or `None` on any kind of
    /// miss — absent, expired, unreachable store, or a snapshot that no
    /// longer deserializes.
    pub async fn get(&self, owner: Uuid) -> Option<Vec<Task>> {
        let key = task_list_key(owner);
        let bytes = self.backend.get(&key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "corrupt cache entry; treating as miss");
                None
            }
        }
    }

    /// Stores a snapshot of `owner`'s task list. Best-effort.
    pub async fn set(&self, owner: Uuid, tasks: &[Task]) {
        let key = task_list_key(owner);
        match serde_json::to_vec(tasks) {
            Ok(bytes) => self.backend.set(&key, bytes, self.ttl).await,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize task list for cache");
            }
        }
    }

    /// Drops `owner`'s snapshot. Idempotent and best-effort.
    pub async fn invalidate(&self, owner: Uuid) {
        self.backend.invalidate(&task_list_key(owner)).await;
    }

    pub fn mode(&self) -> &'static str {
        self.backend.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack_core::TaskFields;

    fn sample_task(owner: Uuid) -> Task {
        let fields = TaskFields {
            title: Some("Buy milk".to_string()),
            ..TaskFields::default()
        }
        .validate_for_create()
        .unwrap();
        Task::new(owner, fields)
    }

    #[test]
    fn key_scheme_is_owner_scoped() {
        let owner = Uuid::new_v4();
        assert_eq!(task_list_key(owner), format!("tasks:{owner}"));
    }

    #[tokio::test]
    async fn snapshot_roundtrips_through_the_backend() {
        let cache = TaskListCache::new(CacheBackend::new_local());
        let owner = Uuid::new_v4();
        let tasks = vec![sample_task(owner)];

        assert!(cache.get(owner).await.is_none());
        cache.set(owner, &tasks).await;
        assert_eq!(cache.get(owner).await, Some(tasks));
    }

    #[tokio::test]
    async fn snapshots_are_never_mixed_across_owners() {
        let cache = TaskListCache::new(CacheBackend::new_local());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        cache.set(alice, &[sample_task(alice)]).await;

        assert!(cache.get(bob).await.is_none());
        cache.invalidate(bob).await;
        // Bob's invalidation never touches Alice's entry.
        assert!(cache.get(alice).await.is_some());
    }

    #[tokio::test]
    async fn corrupt_entries_degrade_to_a_miss() {
        let backend = CacheBackend::new_local();
        let cache = TaskListCache::new(backend.clone());
        let owner = Uuid::new_v4();
        backend
            .set(&task_list_key(owner), b"not json".to_vec(), TASK_LIST_TTL)
            .await;

        assert!(cache.get(owner).await.is_none());
    }
}
