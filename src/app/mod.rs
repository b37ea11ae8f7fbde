//! Application assembly
//!
//! Builds the long-lived components of a coordinator from loaded settings:
//! the shared store, the worker runtime and the engine.

pub mod error_handling;
pub mod logging;

pub use error_handling::{error_chain, handle_fatal_error};
pub use logging::{init_logging, LogConfig, ProcessRole};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{LoadedSettings, Settings};
use crate::engine::Engine;
use crate::job::JobRegistry;
use crate::server::AppState;
use crate::store::{KeyValueStore, StoreFactory};
use crate::worker::{build_runtime, RuntimeContext};

/// A fully wired coordinator
pub struct App {
    pub settings: Settings,
    pub config_path: Option<PathBuf>,
    pub registry: Arc<JobRegistry>,
    pub store: Arc<dyn KeyValueStore>,
    pub engine: Arc<Engine>,
}

impl App {
    pub async fn build(loaded: LoadedSettings, registry: JobRegistry) -> Result<Self> {
        let LoadedSettings { settings, source } = loaded;
        let registry = Arc::new(registry);

        let store = StoreFactory::from_config(&settings.store)
            .await
            .with_context(|| {
                format!("Failed to open the {} store", settings.store.backend.as_str())
            })?;

        let runtime = build_runtime(
            &settings.worker,
            RuntimeContext {
                store: Arc::clone(&store),
                registry: Arc::clone(&registry),
                namespace: settings.engine.namespace.clone(),
                config_path: source.clone(),
            },
        )
        .context("Failed to set up the worker runtime")?;

        let engine = Engine::new(settings.engine.clone(), Arc::clone(&store), runtime)?;

        info!(
            "Coordinator ready: {} store, {} runtime, {} jobs",
            settings.store.backend.as_str(),
            settings.worker.runtime.as_str(),
            registry.len()
        );

        Ok(Self {
            settings,
            config_path: source,
            registry,
            store,
            engine: Arc::new(engine),
        })
    }

    /// Shared state for the HTTP layer
    pub fn state(&self) -> AppState {
        AppState {
            engine: Arc::clone(&self.engine),
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
        }
    }
}
