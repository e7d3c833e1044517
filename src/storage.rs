use crate::errors::CacheError;
use crate::models::Dataset;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Local mirror of the full dataset, stored as one JSON blob.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache. Absent, unreadable or corrupt caches all read as empty.
    pub async fn load(&self) -> Dataset {
        match self.try_load().await {
            Ok(data) => data,
            Err(CacheError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Dataset::default()
            }
            Err(err) => {
                debug!(path = %self.path.display(), "ignoring local cache: {err}");
                Dataset::default()
            }
        }
    }

    pub async fn try_load(&self) -> Result<Dataset, CacheError> {
        let bytes = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes the dataset. Failures are logged and leave the previous cache in place.
    pub async fn save(&self, data: &Dataset) {
        if let Err(err) = self.write(data).await {
            warn!(path = %self.path.display(), "failed to write local cache: {err}");
        }
    }

    async fn write(&self, data: &Dataset) -> Result<(), std::io::Error> {
        let payload = serde_json::to_vec_pretty(data)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await
    }
}
