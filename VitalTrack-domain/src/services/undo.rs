use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::services::store::{ReadingStore, StoreError};
use vital_track_data::models::Reading;
use vital_track_data::storage::ReadingStorage;

/// How long a deleted reading stays recoverable by default
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// Observable state of the undo machinery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    /// No deletion is recoverable
    Idle,

    /// The most recent deletion can still be reversed
    PendingUndo,
}

/// A removed reading held in the recoverable buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    /// The reading that was removed
    pub reading: Reading,

    /// Position the reading occupied, where undo will reinsert it
    pub original_index: usize,

    /// When the undo window closes and the deletion becomes permanent
    pub expires_at: DateTime<Utc>,
}

/// One recoverable deletion plus its countdown task
struct PendingEntry {
    record: PendingDeletion,
    timer: JoinHandle<()>,
}

/// Shared slot guarding the single recoverable deletion.
///
/// The generation counter rises on every transition, so a countdown task
/// that already woke up before it was aborted observes a mismatch and
/// leaves the slot alone.
#[derive(Default)]
struct PendingSlot {
    current: Option<PendingEntry>,
    generation: u64,
}

impl PendingSlot {
    /// Discard the current entry, cancelling its countdown
    fn clear(&mut self) -> Option<PendingDeletion> {
        self.generation += 1;
        self.current.take().map(|entry| {
            entry.timer.abort();
            entry.record
        })
    }
}

/// Reversible deletion for the reading journal.
///
/// At most one deletion is recoverable at a time: deleting again while a
/// deletion is pending permanently discards the earlier reading and starts
/// a fresh countdown for the new one. When the countdown expires without
/// an undo, the deletion becomes permanent. Cancellation happens under the
/// slot lock, so an expiry can never interleave between a new deletion and
/// its registration.
pub struct UndoController<S: ReadingStorage> {
    /// The journal this controller deletes from and restores to
    store: Arc<Mutex<ReadingStore<S>>>,

    /// The single recoverable deletion
    pending: Arc<Mutex<PendingSlot>>,

    /// Length of the undo countdown
    window: Duration,
}

impl<S: ReadingStorage> UndoController<S> {
    /// Create a controller with the default undo window
    pub fn new(store: Arc<Mutex<ReadingStore<S>>>) -> Self {
        Self::with_window(store, DEFAULT_UNDO_WINDOW)
    }

    /// Create a controller with a custom undo window
    pub fn with_window(store: Arc<Mutex<ReadingStore<S>>>, window: Duration) -> Self {
        Self {
            store,
            pending: Arc::new(Mutex::new(PendingSlot::default())),
            window,
        }
    }

    /// Remove the reading at `index` and hold it in the recoverable
    /// buffer until the undo window closes.
    ///
    /// Any deletion already pending is permanently discarded first. If the
    /// removal itself fails, the earlier pending deletion is left intact.
    pub async fn delete(&self, index: usize) -> Result<Reading, StoreError> {
        let removed = {
            let mut store = self.store.lock().await;
            store.remove_at(index).await?
        };

        let mut slot = self.pending.lock().await;
        if slot.clear().is_some() {
            debug!("Superseding pending deletion, the earlier reading is now permanent");
        }
        let generation = slot.generation;

        let deadline = Utc::now()
            + chrono::Duration::from_std(self.window).unwrap_or_else(|_| chrono::Duration::zero());
        let record = PendingDeletion {
            reading: removed.clone(),
            original_index: index,
            expires_at: deadline,
        };

        let pending = Arc::clone(&self.pending);
        let window = self.window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut slot = pending.lock().await;
            // A stale wakeup after supersede or undo sees a newer generation
            if slot.generation == generation && slot.current.take().is_some() {
                debug!("Undo window expired, deletion is now permanent");
            }
        });

        slot.current = Some(PendingEntry { record, timer });
        debug!("Reading at index {} deleted, undo open until {}", index, deadline);
        Ok(removed)
    }

    /// Reverse the pending deletion, reinserting the reading at its
    /// original position.
    ///
    /// Returns `Ok(true)` when a reading was restored and `Ok(false)` when
    /// nothing was pending; calling this in the idle state is not an error.
    /// A failed write-through save leaves the slot armed, so the deletion
    /// stays recoverable until its window closes.
    pub async fn undo(&self) -> Result<bool, StoreError> {
        let mut slot = self.pending.lock().await;
        let record = match slot.current.as_ref() {
            Some(entry) => entry.record.clone(),
            None => return Ok(false),
        };

        let original_index = record.original_index;
        {
            let mut store = self.store.lock().await;
            store.insert_at(original_index, record.reading).await?;
        }

        // Only a successful reinsert consumes the slot; on a save error the
        // countdown is still running and a retry can find the record again.
        slot.clear();
        debug!("Restored reading at index {}", original_index);
        Ok(true)
    }

    /// Length of the undo countdown
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current state of the undo machinery
    pub async fn state(&self) -> UndoState {
        if self.pending.lock().await.current.is_some() {
            UndoState::PendingUndo
        } else {
            UndoState::Idle
        }
    }

    /// Snapshot of the pending deletion, if one is still recoverable
    pub async fn pending(&self) -> Option<PendingDeletion> {
        self.pending
            .lock()
            .await
            .current
            .as_ref()
            .map(|entry| entry.record.clone())
    }
}
