// Storage module structure
pub mod errors;
mod in_memory;
mod json_file;

// Re-export commonly used types
pub use errors::StorageError;
pub use in_memory::InMemoryStorage;
pub use json_file::JsonFileStorage;

use async_trait::async_trait;

use crate::models::Reading;

/// Persistence contract for the journal's reading collection.
///
/// Implementations hold the collection as a whole: `save` replaces the
/// previous snapshot with the full current collection, `load` returns the
/// last snapshot. There is no diffing and no partial write; every save is
/// an independent, complete document.
#[async_trait]
pub trait ReadingStorage: Send + Sync {
    /// Load the full reading collection.
    ///
    /// Fails soft by contract: a missing, unreadable or corrupt snapshot
    /// yields an empty collection and a log line, never an error.
    async fn load(&self) -> Vec<Reading>;

    /// Replace the stored snapshot with the given collection.
    async fn save(&self, readings: &[Reading]) -> Result<(), StorageError>;
}
