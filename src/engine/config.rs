use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::EngineError;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_CONCURRENT_WORKERS: usize = 10;
pub const DEFAULT_NAMESPACE: &str = "mapreduce";

/// Per-run engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of elements per chunk
    pub chunk_size: usize,

    /// Maximum number of chunks per wave
    pub max_concurrent_workers: usize,

    /// Prefix of every store key written by the engine
    pub namespace: String,

    /// Upper bound on a single chunk's round trip; unset waits indefinitely
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub chunk_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_workers: DEFAULT_MAX_CONCURRENT_WORKERS,
            namespace: DEFAULT_NAMESPACE.to_string(),
            chunk_timeout: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_size == 0 {
            return Err(EngineError::invalid_configuration(
                "chunk_size",
                "must be at least 1",
            ));
        }
        if self.max_concurrent_workers == 0 {
            return Err(EngineError::invalid_configuration(
                "max_concurrent_workers",
                "must be at least 1",
            ));
        }
        if self.namespace.is_empty() || self.namespace.contains(char::is_whitespace) {
            return Err(EngineError::invalid_configuration(
                "namespace",
                "must be non-empty and contain no whitespace",
            ));
        }
        Ok(())
    }
}
