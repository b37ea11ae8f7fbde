//! Core trait definitions for the shared store

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::StoreResult;

/// Key-addressed store shared by the engine and every worker.
///
/// Values are opaque strings; callers that move JSON through the store use
/// [`StoreExt`]. Implementations must be reachable from every worker the
/// configured runtime spawns.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Check the health of the backend
    async fn health_check(&self) -> StoreResult<HealthStatus>;
}

/// JSON helpers available on every store
#[async_trait]
pub trait StoreExt: KeyValueStore {
    /// Serialize `value` to JSON and store it under `key`
    async fn set_json<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }

    /// Read and deserialize the JSON value stored under `key`
    async fn get_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

/// Health report returned by [`KeyValueStore::health_check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub backend_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HealthStatus {
    pub fn healthy(backend_type: &str) -> Self {
        Self {
            healthy: true,
            backend_type: backend_type.to_string(),
            details: None,
        }
    }

    pub fn unhealthy(backend_type: &str, details: impl Into<String>) -> Self {
        Self {
            healthy: false,
            backend_type: backend_type.to_string(),
            details: Some(details.into()),
        }
    }
}
