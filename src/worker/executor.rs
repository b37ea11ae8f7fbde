//! The body of a worker: one chunk in, one result array out

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::error::WorkerError;
use super::protocol::{CompletionSignal, Phase, WorkUnit};
use crate::job::{Job, JobRegistry, Pair};
use crate::store::{KeyValueStore, StoreExt};

/// Executes work units against the shared store.
///
/// Holds only what a standalone worker re-derives on its own: a store
/// connection, the job registry and the key namespace.
pub struct ChunkExecutor {
    store: Arc<dyn KeyValueStore>,
    registry: Arc<JobRegistry>,
    namespace: String,
}

impl ChunkExecutor {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        registry: Arc<JobRegistry>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry,
            namespace: namespace.into(),
        }
    }

    /// Read the unit's payload, transform every element, store the results.
    ///
    /// Results are written only when every element succeeded. The returned
    /// signal is what the caller must deliver to the engine.
    #[instrument(skip(self), fields(job = %unit.job_id, chunk = %unit.chunk_id, role = unit.phase.role()))]
    pub async fn execute(&self, unit: &WorkUnit) -> Result<CompletionSignal, WorkerError> {
        let job = self
            .registry
            .get(unit.job_id)
            .ok_or(WorkerError::UnknownJob(unit.job_id))?;

        let payload_key = unit.payload_key(&self.namespace);
        let payload: Vec<Value> = self
            .store
            .get_json(&payload_key)
            .await?
            .ok_or_else(|| WorkerError::MissingPayload {
                key: payload_key.clone(),
            })?;

        let results = apply_elementwise(&job, unit.phase, &payload)?;
        debug!("Transformed {} elements", results.len());

        self.store
            .set_json(&unit.results_key(&self.namespace), &results)
            .await?;

        Ok(unit.completion_signal())
    }
}

/// Apply the job function for `phase` to every element, preserving order and count
pub fn apply_elementwise(
    job: &Job,
    phase: Phase,
    elements: &[Value],
) -> Result<Vec<Pair>, WorkerError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            job.apply(phase, element)
                .map_err(|source| WorkerError::Job { index, source })
        })
        .collect()
}
