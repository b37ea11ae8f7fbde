use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{EngineError, EngineResult};
use crate::job::Pair;
use crate::store::{KeyValueStore, StoreExt};
use crate::worker::{WorkUnit, WorkerRuntime};

/// Runs one chunk through a worker and collects its result
pub struct ChunkDispatcher {
    store: Arc<dyn KeyValueStore>,
    runtime: Arc<dyn WorkerRuntime>,
    namespace: String,
    chunk_timeout: Option<Duration>,
}

impl ChunkDispatcher {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        runtime: Arc<dyn WorkerRuntime>,
        namespace: impl Into<String>,
        chunk_timeout: Option<Duration>,
    ) -> Self {
        Self {
            store,
            runtime,
            namespace: namespace.into(),
            chunk_timeout,
        }
    }

    /// Store `chunk`, run a worker for `unit`, and return the worker's results.
    ///
    /// Both store entries of the unit are deleted afterwards, whether or not
    /// the round trip succeeded.
    pub async fn operate<T>(&self, unit: &WorkUnit, chunk: &[T]) -> EngineResult<Vec<Pair>>
    where
        T: Serialize + Sync,
    {
        let outcome = self.round_trip(unit, chunk).await;
        self.release(unit).await;
        outcome
    }

    async fn round_trip<T>(&self, unit: &WorkUnit, chunk: &[T]) -> EngineResult<Vec<Pair>>
    where
        T: Serialize + Sync,
    {
        let payload_key = unit.payload_key(&self.namespace);
        self.store
            .set_json(&payload_key, chunk)
            .await
            .map_err(|source| EngineError::Store {
                unit: unit.to_string(),
                source,
            })?;
        debug!("Dispatching {} with {} elements", unit, chunk.len());

        let executed = match self.chunk_timeout {
            Some(limit) => tokio::time::timeout(limit, self.runtime.execute(unit))
                .await
                .map_err(|_| EngineError::ChunkTimeout {
                    unit: unit.to_string(),
                    timeout: limit,
                })?,
            None => self.runtime.execute(unit).await,
        };
        executed.map_err(|source| EngineError::Worker {
            unit: unit.to_string(),
            source,
        })?;

        let results_key = unit.results_key(&self.namespace);
        let raw = self
            .store
            .get(&results_key)
            .await
            .map_err(|source| EngineError::Store {
                unit: unit.to_string(),
                source,
            })?
            .ok_or_else(|| EngineError::MissingResult {
                key: results_key.clone(),
            })?;

        let results: Vec<Pair> =
            serde_json::from_str(&raw).map_err(|source| EngineError::MalformedResult {
                key: results_key.clone(),
                source,
            })?;

        if results.len() != chunk.len() {
            return Err(EngineError::ResultCountMismatch {
                unit: unit.to_string(),
                expected: chunk.len(),
                actual: results.len(),
            });
        }

        Ok(results)
    }

    async fn release(&self, unit: &WorkUnit) {
        for key in [
            unit.payload_key(&self.namespace),
            unit.results_key(&self.namespace),
        ] {
            if let Err(e) = self.store.delete(&key).await {
                warn!("Failed to delete store entry {}: {}", key, e);
            }
        }
    }
}
