use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::models::StateRecord;
use crate::storage::{StateStore, StorageError};

/// Flat JSON object on disk, replaced wholesale on every save.
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
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // temp file must share the directory so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> StateRecord {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", self.path.display());
                return StateRecord::new();
            }
            Err(e) => {
                warn!("Failed to read state file {}: {}, starting empty", self.path.display(), e);
                return StateRecord::new();
            }
        };

        match serde_json::from_str::<StateRecord>(&content) {
            Ok(state) => {
                info!("Loaded {} entries from {}", state.len(), self.path.display());
                state
            }
            Err(e) => {
                warn!("Corrupt state file {}: {}, starting empty", self.path.display(), e);
                StateRecord::new()
            }
        }
    }

    async fn save(&self, state: &StateRecord) -> Result<(), StorageError> {
        let mut json = serde_json::to_vec_pretty(state)?;
        json.push(b'\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .unwrap_or_else(|join| Err(std::io::Error::new(ErrorKind::Other, join)))
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!("Saved {} entries to {}", state.len(), self.path.display());
        Ok(())
    }
}
