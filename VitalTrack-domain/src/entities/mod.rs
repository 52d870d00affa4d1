// Entity module structure
mod derived;

// Re-export commonly used types
pub use derived::{BloodPressureCategory, ChartPoint, DailyAverage, VitalField};

// Journal models re-exported from the data layer for convenience
pub use vital_track_data::models::{CreateReadingRequest, Reading, ReadingForm, SubReading, TimeOfDay};
