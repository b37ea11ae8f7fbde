//! Redis store backend implementation

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

use crate::store::{
    config::RedisConfig,
    error::{StoreError, StoreResult},
    traits::{HealthStatus, KeyValueStore},
};

/// Redis store backend
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create new Redis backend and verify the server answers
    pub async fn new(config: &RedisConfig) -> StoreResult<Self> {
        info!("Initializing Redis store at {}", config.url);

        let mut pool_config = Config::from_url(&config.url);
        let mut limits = PoolConfig::new(config.pool_size);
        limits.timeouts.wait = Some(Duration::from_secs(10));
        limits.timeouts.create = Some(Duration::from_secs(10));
        limits.timeouts.recycle = Some(Duration::from_secs(10));
        pool_config.pool = Some(limits);

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::connection(format!("Failed to create Redis pool: {}", e)))?;

        let store = Self { pool };
        store.ping().await?;
        Ok(store)
    }

    async fn connection(&self) -> StoreResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::connection(format!("Failed to connect to Redis: {}", e)))
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::unavailable(format!("Redis did not answer PING: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        debug!("GET {}", key);
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(StoreError::backend)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!("SET {} ({} bytes)", key, value.len());
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(StoreError::backend)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        debug!("DEL {}", key);
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(StoreError::backend)
    }

    async fn health_check(&self) -> StoreResult<HealthStatus> {
        match self.ping().await {
            Ok(()) => Ok(HealthStatus::healthy("redis")),
            Err(e) => Ok(HealthStatus::unhealthy("redis", e.to_string())),
        }
    }
}
