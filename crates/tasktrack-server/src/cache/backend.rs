//! Cache backend over a local map or Redis.
//!
//! The cache is a pure performance optimization: none of these operations
//! can fail from the caller's point of view. A Redis error, a connection
//! failure, or a slow round-trip degrades a `get` to a miss and a
//! `set`/`invalidate` to a logged no-op — never an error crossing into the
//! task service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

/// Upper bound on any single cache round-trip. A cache call slower than
/// this degrades to a miss instead of stalling the request.
pub const CACHE_OP_TIMEOUT: Duration = Duration::from_secs(1);

/// A cached entry with TTL support (local mode only; Redis enforces TTL
/// server-side via SETEX).
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Vec<u8>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Cache backend with two modes.
///
/// - **Local**: single-process map, used in tests and `cache.mode = "local"`
///   development setups.
/// - **Redis**: the shared cache store all server instances talk to.
///
/// There is deliberately no local tier in front of Redis: invalidation is
/// the single source of cache-consistency truth here, and a per-instance
/// layer would keep serving entries its siblings already deleted.
#[derive(Clone)]
pub enum CacheBackend {
    Local(Arc<DashMap<String, CachedEntry>>),
    Redis(Pool),
}

impl CacheBackend {
    /// Create a new local-only cache backend.
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    /// Create a new Redis-backed cache backend.
    pub fn new_redis(pool: Pool) -> Self {
        CacheBackend::Redis(pool)
    }

    /// Build a Redis backend from a connection URL.
    ///
    /// Only a malformed URL or pool-construction failure falls back to the
    /// local mode; an unreachable Redis keeps the Redis backend and lets
    /// every operation degrade individually, so the store comes back into
    /// use the moment it is reachable again.
    pub fn from_redis_url(url: &str, pool_size: usize, timeout: Duration) -> Self {
        let mut redis_config = deadpool_redis::Config::from_url(url);
        let pool_config = redis_config
            .pool
            .get_or_insert_with(deadpool_redis::PoolConfig::default);
        pool_config.max_size = pool_size;
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
            Ok(pool) => CacheBackend::Redis(pool),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to create Redis pool. Falling back to local cache."
                );
                CacheBackend::new_local()
            }
        }
    }

    /// Get a value from the cache. Absent, expired, errored, and timed-out
    /// lookups are all just misses.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self {
            CacheBackend::Local(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        tracing::debug!(key = %key, "cache hit (local)");
                        return Some(entry.data.clone());
                    }
                    drop(entry);
                    map.remove(key);
                }
                tracing::debug!(key = %key, "cache miss (local)");
                None
            }
            CacheBackend::Redis(pool) => {
                let lookup = async {
                    match pool.get().await {
                        Ok(mut conn) => match conn.get::<_, Option<Vec<u8>>>(key).await {
                            Ok(Some(data)) => {
                                tracing::debug!(key = %key, "cache hit");
                                Some(data)
                            }
                            Ok(None) => {
                                tracing::debug!(key = %key, "cache miss");
                                None
                            }
                            Err(e) => {
                                tracing::warn!(key = %key, error = %e, "Redis GET error");
                                None
                            }
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to get Redis connection");
                            None
                        }
                    }
                };
                match tokio::time::timeout(CACHE_OP_TIMEOUT, lookup).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(key = %key, "cache GET timed out; treating as miss");
                        None
                    }
                }
            }
        }
    }

    /// Set a value with a TTL, overwriting any existing entry. Failures are
    /// logged and swallowed; caching is best-effort.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis(pool) => {
                let ttl_secs = ttl.as_secs();
                let write = async {
                    match pool.get().await {
                        Ok(mut conn) => {
                            if let Err(e) = conn.set_ex::<_, _, ()>(key, &value, ttl_secs).await {
                                tracing::warn!(key = %key, error = %e, "Redis SET error");
                            } else {
                                tracing::debug!(key = %key, ttl_secs = %ttl_secs, "cache set");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to get Redis connection");
                        }
                    }
                };
                if tokio::time::timeout(CACHE_OP_TIMEOUT, write).await.is_err() {
                    tracing::warn!(key = %key, "cache SET timed out; entry not cached");
                }
            }
        }
    }

    /// Delete an entry. Idempotent: deleting an absent key is not an error.
    ///
    /// The deletion is awaited, not detached — mutation handlers rely on the
    /// entry being gone before they answer the client, so a follow-up read
    /// cannot hit the snapshot the mutation just outdated.
    pub async fn invalidate(&self, key: &str) {
        match self {
            CacheBackend::Local(map) => {
                map.remove(key);
                tracing::debug!(key = %key, "cache invalidated (local)");
            }
            CacheBackend::Redis(pool) => {
                let delete = async {
                    match pool.get().await {
                        Ok(mut conn) => {
                            if let Err(e) = conn.del::<_, ()>(key).await {
                                tracing::warn!(key = %key, error = %e, "Redis DEL error");
                            } else {
                                tracing::debug!(key = %key, "cache invalidated");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to get Redis connection");
                        }
                    }
                };
                if tokio::time::timeout(CACHE_OP_TIMEOUT, delete).await.is_err() {
                    tracing::warn!(key = %key, "cache DEL timed out");
                }
            }
        }
    }

    /// Backend name for logging and health reporting.
    pub fn mode(&self) -> &'static str {
        match self {
            CacheBackend::Local(_) => "local",
            CacheBackend::Redis(_) => "redis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_set_then_get_roundtrips() {
        let cache = CacheBackend::new_local();
        cache
            .set("tasks:u1", b"payload".to_vec(), Duration::from_secs(300))
            .await;
        assert_eq!(cache.get("tasks:u1").await, Some(b"payload".to_vec()));
        assert_eq!(cache.get("tasks:u2").await, None);
    }

    #[tokio::test]
    async fn local_entries_expire() {
        let cache = CacheBackend::new_local();
        cache
            .set("tasks:u1", b"old".to_vec(), Duration::from_millis(20))
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("tasks:u1").await, None);
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let cache = CacheBackend::new_local();
        cache
            .set("tasks:u1", b"one".to_vec(), Duration::from_secs(300))
            .await;
        cache
            .set("tasks:u1", b"two".to_vec(), Duration::from_secs(300))
            .await;
        assert_eq!(cache.get("tasks:u1").await, Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let cache = CacheBackend::new_local();
        cache
            .set("tasks:u1", b"payload".to_vec(), Duration::from_secs(300))
            .await;

        cache.invalidate("tasks:u1").await;
        assert_eq!(cache.get("tasks:u1").await, None);
        // Deleting an absent key is a no-op, not an error.
        cache.invalidate("tasks:u1").await;
        assert_eq!(cache.get("tasks:u1").await, None);
    }

    #[test]
    fn entry_expiry_is_ttl_based() {
        let fresh = CachedEntry::new(vec![1], Duration::from_secs(300));
        assert!(!fresh.is_expired());
        let stale = CachedEntry::new(vec![1], Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert!(stale.is_expired());
    }
}
