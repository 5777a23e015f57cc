use std::{env, fs};

use tasktrack_server::config::load_config;

#[test]
fn config_parsing_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("tasktrack.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[storage]
backend = "memory"

[redis]
url = "redis://localhost:6379"

[cache]
mode = "local"
ttl_secs = 300

[auth]
secret = "test-secret"
token_ttl_secs = 3600

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.storage.backend, "memory");
    assert_eq!(cfg.cache.mode, "local");
    assert_eq!(cfg.cache.ttl_secs, 300);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("TASKTRACK__SERVER__PORT", "9099");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9099);
    unsafe {
        env::remove_var("TASKTRACK__SERVER__PORT");
    }

    // 3) Missing file still yields the documented local-dev defaults
    let cfg_default = load_config(Some(dir.path().join("absent.toml").to_str().unwrap()))
        .expect("missing file falls back to defaults");
    assert_eq!(cfg_default.server.port, 5000);
    assert_eq!(cfg_default.storage.backend, "mongodb");
    assert_eq!(cfg_default.storage.mongodb.uri, "mongodb://localhost:27017");
    assert_eq!(cfg_default.redis.url, "redis://localhost:6379");
    assert_eq!(cfg_default.cache.ttl_secs, 300);
    assert_eq!(cfg_default.auth.token_ttl_secs, 7 * 24 * 3600);

    // 4) Invalid configs are rejected with a pointed message
    let invalid_path = dir.path().join("invalid.toml");
    fs::write(&invalid_path, "[storage]\nbackend = \"oracle\"\n").expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("storage.backend"));

    let invalid_cache = dir.path().join("invalid_cache.toml");
    fs::write(
        &invalid_cache,
        "[storage]\nbackend = \"memory\"\n\n[cache]\nmode = \"local\"\nttl_secs = 0\n",
    )
    .expect("write invalid toml");
    let err = load_config(invalid_cache.to_str()).expect_err("expected validation error");
    assert!(err.contains("ttl_secs"));
}
