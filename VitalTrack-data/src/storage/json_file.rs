use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::errors::StorageError;
use super::ReadingStorage;
use crate::models::Reading;

/// Current layout version of the persisted document
const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around the reading collection
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    /// Layout version of this document
    version: u32,

    /// The full reading collection, in journal order
    readings: Vec<Reading>,
}

/// File-backed storage holding the whole collection as one JSON document.
///
/// Writes go to a temporary file first and are moved into place with a
/// rename, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    /// Location of the JSON document
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage adapter backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Interpret raw document text, accepting both the versioned envelope
    /// and the legacy bare-array layout
    fn parse_document(&self, text: &str) -> Option<Vec<Reading>> {
        match serde_json::from_str::<StoredDocument>(text) {
            Ok(document) if document.version == SCHEMA_VERSION => Some(document.readings),
            Ok(document) => {
                warn!(
                    "Unsupported document version {} in {}, starting with an empty journal",
                    document.version,
                    self.path.display()
                );
                None
            }
            // Older installs stored the collection as a bare array
            Err(_) => match serde_json::from_str::<Vec<Reading>>(text) {
                Ok(readings) => {
                    debug!(
                        "Loaded legacy bare-array document from {}",
                        self.path.display()
                    );
                    Some(readings)
                }
                Err(e) => {
                    warn!(
                        "Discarding unreadable journal document {}: {}",
                        self.path.display(),
                        e
                    );
                    None
                }
            },
        }
    }
}

#[async_trait]
impl ReadingStorage for JsonFileStorage {
    async fn load(&self) -> Vec<Reading> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No journal document at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read journal document {}: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        self.parse_document(&text).unwrap_or_default()
    }

    async fn save(&self, readings: &[Reading]) -> Result<(), StorageError> {
        let document = StoredDocument {
            version: SCHEMA_VERSION,
            readings: readings.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved {} readings to {}", readings.len(), self.path.display());
        Ok(())
    }
}
