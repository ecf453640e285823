use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::errors::StoreError;
use crate::domain::models::Snapshot;
use crate::domain::ports::SnapshotStore;

/// Key the cache blob is stored under inside the snapshot file.
pub const CACHE_KEY: &str = "yt_name_fix_cache_v2";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    #[serde(rename = "yt_name_fix_cache_v2", default)]
    cache: Snapshot,
}

/// Snapshot store backed by a single JSON file.
///
/// Saves go to a sibling `.tmp` file that is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot file yet");
                return Ok(Snapshot::new());
            }
            Err(err) => return Err(err.into()),
        };

        let file: StorageFile = serde_json::from_slice(&bytes)?;
        Ok(file.cache)
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let entries = snapshot.len();
        let bytes = serde_json::to_vec(&StorageFile { cache: snapshot })?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), entries, bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}
