use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use vital_track_data::models::{CreateReadingRequest, Reading};
use vital_track_data::storage::{ReadingStorage, StorageError};

/// Reading store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Validation error on a submitted reading
    #[error("Validation error: {0}")]
    Validation(String),

    /// Index outside the collection bounds
    #[error("Index {index} out of range for a journal of {len} readings")]
    IndexOutOfRange { index: usize, len: usize },

    /// A write-through save failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The ordered reading collection with write-through persistence.
///
/// The store owns the journal for the lifetime of the process: it is
/// loaded from storage once at startup and every mutation saves the full
/// collection back before returning. When a save fails the in-memory
/// mutation is rolled back, so the collection always matches the last
/// successful save.
pub struct ReadingStore<S: ReadingStorage> {
    /// Injected persistence adapter
    storage: S,

    /// The journal, in insertion order
    readings: Vec<Reading>,
}

impl<S: ReadingStorage> ReadingStore<S> {
    /// Load the journal from storage. Called once at process start.
    pub async fn load(storage: S) -> Self {
        let readings = storage.load().await;
        debug!("Loaded {} readings from storage", readings.len());
        Self { storage, readings }
    }

    /// Read-only view of the journal, in insertion order
    pub fn all(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings in the journal
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the journal has no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Validate a submission and append it to the end of the journal
    pub async fn append(&mut self, request: CreateReadingRequest) -> Result<(), StoreError> {
        validate_request(&request)?;

        let reading = Reading::from(request);
        debug!("Appending {} reading for {}", reading.time, reading.date);

        self.readings.push(reading);
        if let Err(e) = self.storage.save(&self.readings).await {
            // Roll back; the collection must match the last successful save
            self.readings.pop();
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove and return the reading at `index`
    pub async fn remove_at(&mut self, index: usize) -> Result<Reading, StoreError> {
        if index >= self.readings.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.readings.len(),
            });
        }

        let removed = self.readings.remove(index);
        if let Err(e) = self.storage.save(&self.readings).await {
            self.readings.insert(index, removed);
            return Err(e.into());
        }

        debug!("Removed reading at index {}", index);
        Ok(removed)
    }

    /// Reinsert a previously removed reading at `index`, shifting later
    /// readings forward. Valid positions run up to and including the
    /// current length.
    pub async fn insert_at(&mut self, index: usize, reading: Reading) -> Result<(), StoreError> {
        if index > self.readings.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.readings.len(),
            });
        }

        self.readings.insert(index, reading);
        if let Err(e) = self.storage.save(&self.readings).await {
            self.readings.remove(index);
            return Err(e.into());
        }

        debug!("Reinserted reading at index {}", index);
        Ok(())
    }
}

/// Validate a submission, flattening field errors into one user-facing
/// message
fn validate_request(request: &CreateReadingRequest) -> Result<(), StoreError> {
    if let Err(validation_errors) = request.validate() {
        return Err(StoreError::Validation(flatten_errors(&validation_errors)));
    }

    // Sanity rule on each measurement set
    for sub in std::iter::once(&request.first).chain(request.second.as_ref()) {
        if sub.systolic <= sub.diastolic {
            return Err(StoreError::Validation(
                "Systolic pressure must be greater than diastolic pressure".to_string(),
            ));
        }
    }

    Ok(())
}

/// Collect validation messages from every field, including nested
/// measurement sets, into a single sorted summary
fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|error| match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                parts.push(format!("{}: {}", field, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => {
                parts.push(format!("{}: {}", field, flatten_errors(nested)));
            }
            ValidationErrorsKind::List(items) => {
                for (position, nested) in items {
                    parts.push(format!("{}[{}]: {}", field, position, flatten_errors(nested)));
                }
            }
        }
    }

    parts.sort();
    parts.join("; ")
}
