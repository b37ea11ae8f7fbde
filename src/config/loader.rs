//! Configuration file discovery and loading
//!
//! Resolution order: an explicit path, then `MAPREDUCE_CONFIG`, then
//! `config.<MAPREDUCE_ENV>.toml` in the working directory if present, then
//! built-in defaults. Environment overrides are applied last.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{ConfigError, Settings, CONFIG_ENV_VAR, ENVIRONMENT_ENV_VAR};

const DEFAULT_ENVIRONMENT: &str = "development";

/// Settings together with the file they were read from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Absolute path of the configuration file, `None` for built-in defaults
    pub source: Option<PathBuf>,
}

/// Load settings from the process environment and working directory
pub async fn load_settings(explicit: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
    load_settings_with(explicit, Path::new("."), |var| std::env::var(var).ok()).await
}

/// Load settings, resolving relative paths against `working_dir` and reading
/// environment variables through `lookup`
pub async fn load_settings_with<F>(
    explicit: Option<&Path>,
    working_dir: &Path,
    lookup: F,
) -> Result<LoadedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = resolve_config_path(explicit, working_dir, &lookup).await;

    let (mut settings, source) = match path {
        Some(path) => {
            let settings = read_settings(&path).await?;
            let source = fs::canonicalize(&path).await.unwrap_or(path);
            debug!("Loaded configuration from {}", source.display());
            (settings, Some(source))
        }
        None => {
            debug!("No configuration file found, using defaults");
            (Settings::default(), None)
        }
    };

    settings.merge_env_with(&lookup)?;
    settings.validate()?;

    Ok(LoadedSettings { settings, source })
}

async fn resolve_config_path<F>(
    explicit: Option<&Path>,
    working_dir: &Path,
    lookup: &F,
) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Some(working_dir.join(path));
    }

    if let Some(path) = lookup(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(working_dir.join(path));
    }

    let environment =
        lookup(ENVIRONMENT_ENV_VAR).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
    let candidate = working_dir.join(format!("config.{environment}.toml"));
    match fs::try_exists(&candidate).await {
        Ok(true) => Some(candidate),
        _ => None,
    }
}

async fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
