//! Shared key-value store
//!
//! The store is the only channel between the engine and its workers: the
//! engine writes each chunk's payload, the worker writes the chunk's results,
//! and the engine reads them back. Backends must therefore be reachable from
//! wherever the configured worker runtime executes.

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod traits;

pub use backends::{FileStore, MemoryStore};
#[cfg(feature = "redis")]
pub use backends::RedisStore;
pub use config::{BackendType, FileConfig, RedisConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use factory::StoreFactory;
pub use traits::{HealthStatus, KeyValueStore, StoreExt};
