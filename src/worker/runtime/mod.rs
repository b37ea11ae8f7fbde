//! Worker runtimes: how a work unit gets a worker of its own
//!
//! A runtime starts one isolated worker per unit and resolves once that
//! worker's completion signal arrives. The worker only communicates through
//! the shared store and the signal.

mod process;
mod task;

pub use process::ProcessWorkerRuntime;
pub use task::TaskWorkerRuntime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::error::WorkerError;
use super::executor::ChunkExecutor;
use super::protocol::WorkUnit;
use crate::job::JobRegistry;
use crate::store::KeyValueStore;

#[async_trait]
pub trait WorkerRuntime: Send + Sync {
    /// Start a worker for `unit` and wait for its completion signal
    async fn execute(&self, unit: &WorkUnit) -> Result<(), WorkerError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Which runtime executes workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// One OS process per chunk (default)
    #[default]
    Process,
    /// One tokio task per chunk inside the coordinator process
    Task,
}

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Process => "process",
            RuntimeKind::Task => "task",
        }
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "task" => Ok(Self::Task),
            other => Err(format!(
                "unknown worker runtime `{other}` (expected process or task)"
            )),
        }
    }
}

/// Worker runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub runtime: RuntimeKind,

    /// Worker executable; defaults to the running binary
    pub program: Option<PathBuf>,
}

/// Everything a runtime may hand to its workers
pub struct RuntimeContext {
    pub store: Arc<dyn KeyValueStore>,
    pub registry: Arc<JobRegistry>,
    pub namespace: String,
    /// Configuration file the coordinator loaded, exported to worker processes
    pub config_path: Option<PathBuf>,
}

/// Build the runtime selected by `config`
pub fn build_runtime(
    config: &WorkerConfig,
    context: RuntimeContext,
) -> Result<Arc<dyn WorkerRuntime>, WorkerError> {
    match config.runtime {
        RuntimeKind::Task => {
            let executor =
                ChunkExecutor::new(context.store, context.registry, context.namespace);
            Ok(Arc::new(TaskWorkerRuntime::new(Arc::new(executor))))
        }
        RuntimeKind::Process => {
            let program = match &config.program {
                Some(program) => program.clone(),
                None => std::env::current_exe().map_err(|e| WorkerError::Process(e.into()))?,
            };
            let mut runtime = ProcessWorkerRuntime::new(program);
            if let Some(path) = context.config_path {
                runtime = runtime.with_config_path(path);
            }
            Ok(Arc::new(runtime))
        }
    }
}
