// Model module structure
mod reading;

// Re-export commonly used types
pub use reading::{CreateReadingRequest, Reading, ReadingForm, SubReading, TimeOfDay};
