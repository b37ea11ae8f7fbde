//! Workers: isolated executors of a single chunk
//!
//! A worker is handed only a [`WorkUnit`]. It loads the chunk from the shared
//! store, applies the job's mapper or reducer to every element, writes the
//! results back and emits its [`CompletionSignal`].

pub mod error;
pub mod executor;
pub mod protocol;
pub mod runtime;

pub use error::WorkerError;
pub use executor::{apply_elementwise, ChunkExecutor};
pub use protocol::{ChunkId, CompletionSignal, Phase, WorkUnit};
pub use runtime::{
    build_runtime, ProcessWorkerRuntime, RuntimeContext, RuntimeKind, TaskWorkerRuntime,
    WorkerConfig, WorkerRuntime,
};

use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::job::JobRegistry;
use crate::store::StoreFactory;
use crate::subprocess::ProcessError;

/// Entry point of a standalone worker process.
///
/// Connects to the configured store, executes `unit` and writes the
/// completion line to stdout. Nothing is written to stdout on failure.
pub async fn run_worker(
    store_config: &crate::store::StoreConfig,
    namespace: &str,
    registry: Arc<JobRegistry>,
    unit: WorkUnit,
) -> Result<CompletionSignal, WorkerError> {
    let store = StoreFactory::from_config(store_config).await?;
    let executor = ChunkExecutor::new(store, registry, namespace);

    let signal = executor.execute(&unit).await?;
    info!("Completed {}", unit);

    let mut stdout = tokio::io::stdout();
    let line = format!("{}\n", signal.message());
    stdout
        .write_all(line.as_bytes())
        .await
        .map_err(ProcessError::from)?;
    stdout.flush().await.map_err(ProcessError::from)?;

    Ok(signal)
}
