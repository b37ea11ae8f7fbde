//! Store factory for creating store instances

use std::sync::Arc;

use super::backends::{FileStore, MemoryStore};
#[cfg(feature = "redis")]
use super::backends::RedisStore;
use super::config::{BackendType, StoreConfig};
use super::error::StoreResult;
use super::traits::KeyValueStore;

/// Factory for creating store instances
pub struct StoreFactory;

impl StoreFactory {
    /// Create the store described by `config`
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Arc<dyn KeyValueStore>> {
        match config.backend {
            BackendType::File => {
                let store = FileStore::from_config(&config.file).await?;
                Ok(Arc::new(store))
            }
            BackendType::Memory => Ok(Arc::new(MemoryStore::new())),
            #[cfg(feature = "redis")]
            BackendType::Redis => {
                let store = RedisStore::new(&config.redis).await?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "redis"))]
            BackendType::Redis => Err(super::error::StoreError::configuration(
                "Redis backend not enabled. Enable with --features redis",
            )),
        }
    }
}
