//! Store configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Store backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Directory of JSON files, shared by processes on one host (default)
    #[default]
    File,
    /// In-process map, only visible to workers running as tasks
    Memory,
    /// Redis server (requires the `redis` feature)
    Redis,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }

    /// Whether a separate worker process can reach data written by the engine
    pub fn is_shared_across_processes(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "unknown store backend `{other}` (expected file, memory or redis)"
            )),
        }
    }
}

/// Main store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store backend type
    pub backend: BackendType,

    /// File backend settings
    pub file: FileConfig,

    /// Redis backend settings
    pub redis: RedisConfig,
}

/// File store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Directory holding one file per entry
    pub base_dir: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            base_dir: default_store_dir(),
        }
    }
}

/// Redis store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL
    pub url: String,

    /// Maximum pooled connections per process
    pub pool_size: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 16,
        }
    }
}

fn default_store_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mapreduce-server")
        .join("store")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!("file".parse::<BackendType>().unwrap(), BackendType::File);
        assert_eq!("Redis".parse::<BackendType>().unwrap(), BackendType::Redis);
        assert!("sqlite".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_memory_backend_is_process_local() {
        assert!(!BackendType::Memory.is_shared_across_processes());
        assert!(BackendType::File.is_shared_across_processes());
        assert!(BackendType::Redis.is_shared_across_processes());
    }

    #[test]
    fn test_store_config_from_toml() {
        let config: StoreConfig = toml::from_str(
            r#"
            backend = "redis"

            [redis]
            url = "redis://cache:6380"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendType::Redis);
        assert_eq!(config.redis.url, "redis://cache:6380");
        assert_eq!(config.redis.pool_size, 16);
        assert!(config.file.base_dir.ends_with("mapreduce-server/store"));
    }
}
