// VitalTrack Data
// This crate handles reading models and persistence adapters

// Data models for journal readings
pub mod models;

// Persistence adapters for the reading collection
pub mod storage;
