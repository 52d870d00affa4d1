// Service module structure
pub mod aggregation;
pub mod store;
pub mod undo;

// Re-export commonly used types
pub use store::{ReadingStore, StoreError};
pub use undo::{PendingDeletion, UndoController, UndoState, DEFAULT_UNDO_WINDOW};
