//! Application configuration.
//!
//! Loaded from an optional `tasktrack.toml` with environment overrides using
//! the `TASKTRACK` prefix and `__` separator (e.g.
//! `TASKTRACK__SERVER__PORT=8080`). Every setting has a local-development
//! default, so the server boots with no configuration at all against a local
//! MongoDB and Redis.

use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        let backends = ["mongodb", "memory"];
        if !backends.contains(&self.storage.backend.as_str()) {
            return Err(format!("storage.backend must be one of {backends:?}"));
        }
        if self.storage.backend == "mongodb" {
            if self.storage.mongodb.uri.is_empty() {
                return Err("storage.mongodb.uri must not be empty".into());
            }
            if self.storage.mongodb.database.is_empty() {
                return Err("storage.mongodb.database must not be empty".into());
            }
        }
        let cache_modes = ["redis", "local"];
        if !cache_modes.contains(&self.cache.mode.as_str()) {
            return Err(format!("cache.mode must be one of {cache_modes:?}"));
        }
        if self.cache.ttl_secs == 0 {
            return Err("cache.ttl_secs must be > 0".into());
        }
        if self.cache.mode == "redis" && self.redis.url.is_empty() {
            return Err("cache.mode=redis requires redis.url".into());
        }
        if self.auth.secret.is_empty() {
            return Err("auth.secret must not be empty".into());
        }
        if self.auth.token_ttl_secs == 0 {
            return Err("auth.token_ttl_secs must be > 0".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `mongodb` (the real document store) or `memory` (local development).
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default)]
    pub mongodb: MongoConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            mongodb: MongoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_mongo_uri")]
    pub uri: String,
    #[serde(default = "default_mongo_database")]
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_mongo_uri(),
            database: default_mongo_database(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `redis` (the shared cache store) or `local` (single-process map).
    #[serde(default = "default_cache_mode")]
    pub mode: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: default_cache_mode(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. The default exists for local development only.
    #[serde(default = "default_auth_secret")]
    pub secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_auth_secret(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_storage_backend() -> String {
    "mongodb".to_string()
}
fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}
fn default_mongo_database() -> String {
    "tasktrack".to_string()
}
fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_redis_pool_size() -> usize {
    16
}
fn default_redis_timeout_ms() -> u64 {
    1000
}
fn default_cache_mode() -> String {
    "redis".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_auth_secret() -> String {
    "dev-secret-change-me".to_string()
}
fn default_token_ttl_secs() -> u64 {
    // Seven days, matching the default access token lifetime.
    7 * 24 * 3600
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Loads configuration from an optional TOML file plus environment
/// overrides, then validates it.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path).required(false));
    }
    // Environment variable overrides, e.g. TASKTRACK__SERVER__PORT=8080
    let cfg = builder
        .add_source(
            Environment::with_prefix("TASKTRACK")
                .try_parsing(true)
                .separator("__"),
        )
        .build()
        .map_err(|e| format!("Failed to load config: {e}"))?;

    let app_config: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| format!("Failed to deserialize config: {e}"))?;

    app_config.validate()?;
    Ok(app_config)
}
