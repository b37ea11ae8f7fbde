use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;
use crate::worker::WorkerError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures of a run. Any chunk failure fails the whole run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("store operation failed for {unit}")]
    Store {
        unit: String,
        #[source]
        source: StoreError,
    },

    #[error("worker failed for {unit}")]
    Worker {
        unit: String,
        #[source]
        source: WorkerError,
    },

    #[error("{unit} did not complete within {timeout:?}")]
    ChunkTimeout { unit: String, timeout: Duration },

    #[error("worker signaled completion but no result is stored at {key}")]
    MissingResult { key: String },

    #[error("malformed result stored at {key}")]
    MalformedResult {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{unit} returned {actual} results for {expected} elements")]
    ResultCountMismatch {
        unit: String,
        expected: usize,
        actual: usize,
    },
}

impl EngineError {
    pub fn invalid_configuration(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
