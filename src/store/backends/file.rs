//! File-based store backend
//!
//! Each entry lives in its own file under `base_dir`, named by the SHA-256 of
//! its key. Writes go to a temporary sibling first and are renamed into place,
//! so a worker process never observes a half-written value.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::trace;
use uuid::Uuid;

use crate::store::{
    config::FileConfig,
    error::StoreResult,
    traits::{HealthStatus, KeyValueStore},
};

const ENTRY_EXTENSION: &str = "json";

/// File-based store backend
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `base_dir`
    pub async fn new(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    /// Open the store described by `config`
    pub async fn from_config(config: &FileConfig) -> StoreResult<Self> {
        Self::new(&config.base_dir).await
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of committed entries on disk
    pub async fn entry_count(&self) -> StoreResult<usize> {
        let mut count = 0;
        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Path of the file holding `key`
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.base_dir
            .join(format!("{:x}.{}", digest, ENTRY_EXTENSION))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.entry_path(key);
        let staging = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        trace!("Writing {} bytes for {} to {}", value.len(), key, path.display());

        fs::write(&staging, value).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> StoreResult<HealthStatus> {
        match fs::metadata(&self.base_dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::healthy("file")),
            Ok(_) => Ok(HealthStatus::unhealthy(
                "file",
                format!("{} is not a directory", self.base_dir.display()),
            )),
            Err(e) => Ok(HealthStatus::unhealthy(
                "file",
                format!("{}: {}", self.base_dir.display(), e),
            )),
        }
    }
}
