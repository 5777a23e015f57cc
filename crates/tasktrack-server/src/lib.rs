//! HTTP server implementation for Tasktrack.
//!
//! The interesting part of this crate is the pair of modules the rest of the
//! tree exists to serve: [`cache`], the read-through task-list cache, and
//! [`tasks`], the service that orchestrates read-cache-or-fetch and
//! write-then-invalidate around the storage gateway.

use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;
pub mod tasks;

use tasktrack_auth::JwtService;
use tasktrack_db_memory::InMemoryStorage;
use tasktrack_db_mongo::MongoStorage;

use crate::cache::{CacheBackend, TaskListCache};
use crate::config::AppConfig;
use crate::state::AppState;

pub use crate::server::{TasktrackServer, build_app};

/// Builds the cache backend described by the configuration.
pub fn init_cache_backend(cfg: &AppConfig) -> CacheBackend {
    if cfg.cache.mode == "local" {
        tracing::info!("cache mode: local (single-process)");
        return CacheBackend::new_local();
    }
    let backend = CacheBackend::from_redis_url(
        &cfg.redis.url,
        cfg.redis.pool_size,
        std::time::Duration::from_millis(cfg.redis.timeout_ms),
    );
    tracing::info!(mode = backend.mode(), "cache backend initialized");
    backend
}

/// Wires storage, cache, and auth into the shared application state.
pub async fn init_app_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let cache = TaskListCache::new(init_cache_backend(cfg));
    let jwt = JwtService::new(&cfg.auth.secret, cfg.auth.token_ttl_secs);

    let state = match cfg.storage.backend.as_str() {
        "memory" => {
            tracing::warn!("storage backend: memory (data is not persisted)");
            let storage = Arc::new(InMemoryStorage::new());
            AppState::new(storage.clone(), storage, cache, jwt)
        }
        _ => {
            let storage = Arc::new(
                MongoStorage::connect(&cfg.storage.mongodb.uri, &cfg.storage.mongodb.database)
                    .await?,
            );
            AppState::new(storage.clone(), storage, cache, jwt)
        }
    };
    Ok(state)
}
