//! Service configuration
//!
//! Settings come from a TOML file (see [`loader`]) with environment variable
//! overrides on top. Coordinator and worker processes load them the same way,
//! so both sides agree on the store and the key namespace.

pub mod loader;

#[cfg(test)]
mod tests;

pub use loader::{load_settings, load_settings_with, LoadedSettings};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::{EngineConfig, EngineError};
use crate::store::StoreConfig;
use crate::worker::{RuntimeKind, WorkerConfig};

/// Path of the configuration file, also exported to worker processes
pub const CONFIG_ENV_VAR: &str = "MAPREDUCE_CONFIG";

/// Selects `config.<env>.toml` when no file is given explicitly
pub const ENVIRONMENT_ENV_VAR: &str = "MAPREDUCE_ENV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value `{value}` for {var}: {reason}")]
    InvalidEnvVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Incompatible(String),
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub worker: WorkerConfig,
}

impl Settings {
    /// Apply overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<(), ConfigError> {
        self.merge_env_with(|var| std::env::var(var).ok())
    }

    /// Apply overrides, reading variables through `lookup`
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ENGINE_CHUNK_SIZE") {
            self.engine.chunk_size = parse_var("ENGINE_CHUNK_SIZE", value)?;
        }

        if let Some(value) = lookup("ENGINE_MAX_CONCURRENT_WORKERS") {
            self.engine.max_concurrent_workers =
                parse_var("ENGINE_MAX_CONCURRENT_WORKERS", value)?;
        }

        if let Some(value) = lookup("MAPREDUCE_NAMESPACE") {
            self.engine.namespace = value;
        }

        if let Some(value) = lookup("MAPREDUCE_STORE_BACKEND") {
            self.store.backend = parse_var("MAPREDUCE_STORE_BACKEND", value)?;
        }

        if let Some(value) = lookup("MAPREDUCE_STORE_DIR") {
            self.store.file.base_dir = PathBuf::from(value);
        }

        if let Some(value) = lookup("REDIS_URL") {
            self.store.redis.url = value;
        }

        if let Some(value) = lookup("APP_HOST") {
            self.server.host = value;
        }

        if let Some(value) = lookup("APP_PORT") {
            self.server.port = parse_var("APP_PORT", value)?;
        }

        if let Some(value) = lookup("MAPREDUCE_WORKER_RUNTIME") {
            self.worker.runtime = parse_var("MAPREDUCE_WORKER_RUNTIME", value)?;
        }

        if let Some(value) = lookup("MAPREDUCE_WORKER_PROGRAM") {
            self.worker.program = Some(PathBuf::from(value));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        if self.worker.runtime == RuntimeKind::Process
            && !self.store.backend.is_shared_across_processes()
        {
            return Err(ConfigError::Incompatible(format!(
                "the {} store is private to one process; use the file or redis store with the process worker runtime",
                self.store.backend.as_str()
            )));
        }

        Ok(())
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
            var,
            reason: e.to_string(),
            value,
        })
}
