use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::warn;

use super::errors::StorageError;
use super::ReadingStorage;
use crate::models::Reading;

/// In-memory storage implementation for the reading collection.
///
/// Serves ephemeral sessions and doubles as the storage fake in tests.
/// Clones share the same underlying collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Last saved snapshot
    readings: Arc<Mutex<Vec<Reading>>>,
}

impl InMemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory storage seeded with readings
    pub fn with_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
        }
    }

    /// Copy of the currently stored snapshot
    pub fn snapshot(&self) -> Vec<Reading> {
        self.readings
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReadingStorage for InMemoryStorage {
    async fn load(&self) -> Vec<Reading> {
        match self.readings.lock() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                warn!("Reading collection lock poisoned, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    async fn save(&self, readings: &[Reading]) -> Result<(), StorageError> {
        let mut guard = self.readings.lock()?;
        *guard = readings.to_vec();
        Ok(())
    }
}
