//! Common test utilities and fixtures

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use mapreduce_server::config::{LoadedSettings, Settings};
use mapreduce_server::engine::{Engine, EngineConfig};
use mapreduce_server::job::JobRegistry;
use mapreduce_server::store::{BackendType, MemoryStore};
use mapreduce_server::worker::{ChunkExecutor, RuntimeKind, TaskWorkerRuntime};

/// The seven transactions shared by both scenarios
pub fn transactions() -> Vec<Value> {
    vec![
        json!({"id": 1, "merchant": "Starbucks", "amount": 1.78, "date": "2018-01-01", "reflected": "GOOD", "user_id": 1}),
        json!({"id": 2, "merchant": "Starbucks", "amount": 5.76, "date": "2018-01-02", "reflected": "GOOD", "user_id": 1}),
        json!({"id": 3, "merchant": "Tim Hortons", "amount": 8.76, "date": "2018-01-03", "reflected": "NEUTRAL", "user_id": 1}),
        json!({"id": 4, "merchant": "Tim Hortons", "amount": 5.67, "date": "2018-01-04", "reflected": "BAD", "user_id": 1}),
        json!({"id": 5, "merchant": "Tim Hortons", "amount": 11.76, "date": "2018-01-06", "reflected": "GOOD", "user_id": 1}),
        json!({"id": 5, "merchant": "Starbucks", "amount": 12.36, "date": "2018-01-07", "reflected": "GOOD", "user_id": 2}),
        json!({"id": 5, "merchant": "Tim Hortons", "amount": 1.45, "date": "2018-01-08", "reflected": "GOOD", "user_id": 2}),
    ]
}

/// Transactions plus the two user name records
pub fn happiness_payload() -> Vec<Value> {
    let mut payload = transactions();
    payload.push(json!({"id": 1, "name": "John"}));
    payload.push(json!({"id": 2, "name": "Luke"}));
    payload
}

pub fn transaction_count_output() -> Value {
    json!({"merchant_transaction_count": [["Starbucks", 3], ["Tim Hortons", 4]]})
}

pub fn happiness_output() -> Value {
    json!({"user_happiness": [["John", "60%"], ["Luke", "100%"]]})
}

/// Engine running workers as tasks against an in-memory store
pub fn task_engine(config: EngineConfig) -> (Engine, MemoryStore) {
    let store = MemoryStore::new();
    let executor = ChunkExecutor::new(
        Arc::new(store.clone()),
        Arc::new(JobRegistry::with_builtin_jobs()),
        config.namespace.clone(),
    );
    let runtime = Arc::new(TaskWorkerRuntime::new(Arc::new(executor)));
    let engine = Engine::new(config, Arc::new(store.clone()), runtime).unwrap();
    (engine, store)
}

/// Settings for the task runtime with an in-memory store
pub fn task_settings() -> LoadedSettings {
    let mut settings = Settings::default();
    settings.store.backend = BackendType::Memory;
    settings.worker.runtime = RuntimeKind::Task;
    LoadedSettings {
        settings,
        source: None,
    }
}

/// A temporary directory holding a file store and a config file pointing at it
pub struct ProcessFixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl ProcessFixture {
    pub fn new(engine_section: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("store");
        let config_path = dir.path().join("mapreduce.toml");
        fs::write(
            &config_path,
            format!(
                "[engine]\n{engine_section}\n\n[store]\nbackend = \"file\"\n\n[store.file]\nbase_dir = {:?}\n\n[worker]\nruntime = \"process\"\n",
                store_dir.display().to_string()
            ),
        )
        .unwrap();
        Self { dir, config_path }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Path of the compiled binary under test
pub fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mapreduce-server"))
}
