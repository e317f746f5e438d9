use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::StateRecord;
use crate::storage::{StateStore, StorageError};

/// Process-local store, for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StateRecord>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(initial: StateRecord) -> Self {
        Self {
            state: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    pub async fn snapshot(&self) -> StateRecord {
        self.state.lock().await.clone()
    }

    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> StateRecord {
        self.state.lock().await.clone()
    }

    async fn save(&self, state: &StateRecord) -> Result<(), StorageError> {
        *self.state.lock().await = state.clone();
        *self.saves.lock().await += 1;
        Ok(())
    }
}
