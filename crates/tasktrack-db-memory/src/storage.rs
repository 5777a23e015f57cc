//! In-memory storage backend backed by concurrent maps.
//!
//! Used by tests and for local development without a MongoDB instance.
//! Records are cloned on the way in and out, so callers never observe
//! aliased mutations.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use tasktrack_core::{Task, User};
use tasktrack_storage::{StorageError, TaskStore, UserStore};

/// In-memory [`TaskStore`] + [`UserStore`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tasks: DashMap<Uuid, Task>,
    users: DashMap<Uuid, User>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks across all owners. Test helper.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[async_trait]
impl TaskStore for InMemoryStorage {
    async fn create(&self, task: &Task) -> Result<Task, StorageError> {
        if self.tasks.contains_key(&task.id) {
            return Err(StorageError::already_exists("tasks", task.id.to_string()));
        }
        self.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, StorageError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        // Creation time descending; id as a tiebreak so ordering is stable
        // when two tasks share a timestamp.
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError> {
        Ok(self
            .tasks
            .get(&id)
            .filter(|task| task.owner == owner)
            .map(|task| task.value().clone()))
    }

    async fn update(&self, task: &Task) -> Result<Option<Task>, StorageError> {
        match self.tasks.get_mut(&task.id) {
            Some(mut entry) if entry.owner == task.owner => {
                *entry = task.clone();
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError> {
        // remove_if is the single-operation find-and-delete: the owner check
        // happens under the same shard lock as the removal.
        Ok(self
            .tasks
            .remove_if(&id, |_, task| task.owner == owner)
            .map(|(_, task)| task))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserStore for InMemoryStorage {
    async fn create_user(&self, user: &User) -> Result<User, StorageError> {
        if self
            .users
            .iter()
            .any(|existing| existing.email == user.email)
        {
            return Err(StorageError::already_exists("users", user.email.clone()));
        }
        self.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| user.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }
}
