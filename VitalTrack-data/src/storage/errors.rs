use std::sync::PoisonError;
use thiserror::Error;

/// Error type for persistence operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error while touching the backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be serialized for writing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(error: PoisonError<T>) -> Self {
        StorageError::Lock(error.to_string())
    }
}
