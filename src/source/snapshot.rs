use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::{FetchError, PageSource};

/// A page rendered ahead of time by a headless browser and saved to disk.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for SnapshotSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Snapshot {
                path: self.path.clone(),
                source,
            })?;
        info!("Read {} bytes from snapshot {}", html.len(), self.path.display());
        Ok(html)
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}
