use super::*;
use crate::store::BackendType;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn write_config(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let loaded = load_settings_with(None, dir.path(), env(&[])).await.unwrap();

    assert!(loaded.source.is_none());
    let settings = loaded.settings;
    assert_eq!(settings.engine.chunk_size, 100);
    assert_eq!(settings.engine.max_concurrent_workers, 10);
    assert_eq!(settings.store.backend, BackendType::File);
    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.worker.runtime, RuntimeKind::Process);
}

#[tokio::test]
async fn test_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[engine]
chunk_size = 5
chunk_timeout = "2m"

[store]
backend = "memory"

[worker]
runtime = "task"
"#,
    );

    let loaded = load_settings_with(Some(path.as_path()), dir.path(), env(&[]))
        .await
        .unwrap();

    assert_eq!(loaded.source, Some(fs::canonicalize(&path).unwrap()));
    assert_eq!(loaded.settings.engine.chunk_size, 5);
    assert_eq!(loaded.settings.engine.max_concurrent_workers, 10);
    assert_eq!(
        loaded.settings.engine.chunk_timeout,
        Some(Duration::from_secs(120))
    );
    assert_eq!(loaded.settings.store.backend, BackendType::Memory);
    assert_eq!(loaded.settings.worker.runtime, RuntimeKind::Task);
}

#[tokio::test]
async fn test_env_var_names_the_file() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "from-env.toml", "[server]\nport = 8080\n");

    let loaded = load_settings_with(
        None,
        dir.path(),
        env(&[("MAPREDUCE_CONFIG", "from-env.toml")]),
    )
    .await
    .unwrap();
    assert_eq!(loaded.settings.server.port, 8080);
}

#[tokio::test]
async fn test_environment_specific_file() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "config.development.toml", "[engine]\nchunk_size = 7\n");
    write_config(&dir, "config.test.toml", "[engine]\nchunk_size = 3\n");

    let loaded = load_settings_with(None, dir.path(), env(&[])).await.unwrap();
    assert_eq!(loaded.settings.engine.chunk_size, 7);

    let loaded = load_settings_with(None, dir.path(), env(&[("MAPREDUCE_ENV", "test")]))
        .await
        .unwrap();
    assert_eq!(loaded.settings.engine.chunk_size, 3);
}

#[tokio::test]
async fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "c.toml", "[engine]\nchunk_size = 5\n");

    let loaded = load_settings_with(
        Some(path.as_path()),
        dir.path(),
        env(&[
            ("ENGINE_CHUNK_SIZE", "9"),
            ("ENGINE_MAX_CONCURRENT_WORKERS", "2"),
            ("MAPREDUCE_NAMESPACE", "jobs"),
            ("MAPREDUCE_STORE_DIR", "/var/lib/mr"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "5000"),
            ("MAPREDUCE_WORKER_PROGRAM", "/usr/local/bin/mr"),
        ]),
    )
    .await
    .unwrap();

    let settings = loaded.settings;
    assert_eq!(settings.engine.chunk_size, 9);
    assert_eq!(settings.engine.max_concurrent_workers, 2);
    assert_eq!(settings.engine.namespace, "jobs");
    assert_eq!(settings.store.file.base_dir, PathBuf::from("/var/lib/mr"));
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 5000);
    assert_eq!(
        settings.worker.program,
        Some(PathBuf::from("/usr/local/bin/mr"))
    );
}

#[tokio::test]
async fn test_invalid_env_value() {
    let dir = TempDir::new().unwrap();
    let result = load_settings_with(None, dir.path(), env(&[("APP_PORT", "eighty")])).await;
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { var: "APP_PORT", .. })
    ));
}

#[tokio::test]
async fn test_missing_explicit_file() {
    let dir = TempDir::new().unwrap();
    let result = load_settings_with(Some(Path::new("nope.toml")), dir.path(), env(&[])).await;
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[tokio::test]
async fn test_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[engine\nchunk_size = ");
    let result = load_settings_with(Some(path.as_path()), dir.path(), env(&[])).await;
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_zero_chunk_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = load_settings_with(None, dir.path(), env(&[("ENGINE_CHUNK_SIZE", "0")])).await;
    assert!(matches!(result, Err(ConfigError::Engine(_))));
}

#[test]
fn test_memory_store_requires_task_runtime() {
    let mut settings = Settings::default();
    settings.store.backend = BackendType::Memory;
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::Incompatible(_))
    ));

    settings.worker.runtime = RuntimeKind::Task;
    assert!(settings.validate().is_ok());
}
