// VitalTrack Domain
// This crate contains the business logic for the VitalTrack journal

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Re-export the storage module from vital_track_data for convenience
pub use vital_track_data::storage;
