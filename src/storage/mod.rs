use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::StateRecord;

mod json;
mod memory;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write state file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize state")]
    Serialize(#[from] serde_json::Error),
}

/// Durable home of the last observed status per entity.
///
/// `load` never fails: anything unreadable is treated as "never observed".
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> StateRecord;
    async fn save(&self, state: &StateRecord) -> Result<(), StorageError>;
}
