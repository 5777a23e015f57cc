//! Shared application state.

use std::sync::Arc;

use tasktrack_auth::JwtService;
use tasktrack_storage::{TaskStore, UserStore};

use crate::cache::TaskListCache;
use crate::tasks::TaskService;

/// Everything the handlers need, wired once at startup. All collaborators
/// come in through here — there is no ambient global to reach for — so tests
/// swap in the memory backend and a local cache without touching a handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: Arc<dyn UserStore>,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(
        task_store: Arc<dyn TaskStore>,
        user_store: Arc<dyn UserStore>,
        cache: TaskListCache,
        jwt: JwtService,
    ) -> Self {
        Self {
            tasks: TaskService::new(task_store, cache),
            users: user_store,
            jwt,
        }
    }
}
