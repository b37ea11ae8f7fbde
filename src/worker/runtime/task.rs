use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::WorkerRuntime;
use crate::worker::error::WorkerError;
use crate::worker::executor::ChunkExecutor;
use crate::worker::protocol::WorkUnit;

/// Runs each unit on its own tokio task.
///
/// The task receives nothing but the unit; its result travels through the
/// store and its completion through a channel carrying the wire message.
pub struct TaskWorkerRuntime {
    executor: Arc<ChunkExecutor>,
}

impl TaskWorkerRuntime {
    pub fn new(executor: Arc<ChunkExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl WorkerRuntime for TaskWorkerRuntime {
    async fn execute(&self, unit: &WorkUnit) -> Result<(), WorkerError> {
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<String>();
        let executor = Arc::clone(&self.executor);
        let task_unit = unit.clone();

        let handle = tokio::spawn(async move {
            let signal = executor.execute(&task_unit).await?;
            // The receiver only goes away if the engine stopped waiting.
            let _ = signal_tx.send(signal.message());
            Ok::<(), WorkerError>(())
        });

        let expected = unit.completion_signal();
        while let Some(message) = signal_rx.recv().await {
            if expected.matches(&message) {
                debug!("Worker task signaled completion for {}", unit);
                return Ok(());
            }
            warn!("Ignoring unexpected worker message: {}", message);
        }

        // Channel closed without the signal: surface why the task stopped.
        match handle.await {
            Ok(Err(e)) => Err(e),
            Ok(Ok(())) | Err(_) => Err(WorkerError::Abandoned {
                unit: unit.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "task"
    }
}
