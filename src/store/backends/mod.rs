//! Store backend implementations

pub mod file;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
