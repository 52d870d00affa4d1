use std::fmt;

use serde::{Deserialize, Serialize};

use vital_track_data::models::SubReading;

/// Per-day mean across every measurement set recorded that day.
/// Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    /// Mean systolic pressure, rounded to the nearest integer
    pub systolic: u16,

    /// Mean diastolic pressure, rounded to the nearest integer
    pub diastolic: u16,

    /// Mean heart rate, rounded to the nearest integer
    pub heart_rate: u16,
}

impl DailyAverage {
    /// The defined result for a day with no matching readings
    pub const ZERO: DailyAverage = DailyAverage {
        systolic: 0,
        diastolic: 0,
        heart_rate: 0,
    };
}

/// One entry of the trend chart, shaped for a rendering surface.
/// Average fields are present only when the entry has two measurement
/// sets, and carry unrounded means.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Composite label, e.g. "Morning - 2024-03-01"
    pub name: String,

    /// First-set systolic value
    pub systolic: u16,

    /// First-set diastolic value
    pub diastolic: u16,

    /// First-set heart rate
    pub heart_rate: u16,

    /// Second-set systolic value, when a second set exists
    pub second_systolic: Option<u16>,

    /// Second-set diastolic value, when a second set exists
    pub second_diastolic: Option<u16>,

    /// Second-set heart rate, when a second set exists
    pub second_heart_rate: Option<u16>,

    /// Unrounded mean systolic across both sets
    pub avg_systolic: Option<f64>,

    /// Unrounded mean diastolic across both sets
    pub avg_diastolic: Option<f64>,

    /// Unrounded mean heart rate across both sets
    pub avg_heart_rate: Option<f64>,
}

/// Selector for one numeric field of a measurement set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalField {
    /// Systolic blood pressure
    Systolic,

    /// Diastolic blood pressure
    Diastolic,

    /// Heart rate
    HeartRate,
}

impl VitalField {
    /// Read this field's value out of a measurement set
    pub fn of(&self, sub: &SubReading) -> u16 {
        match self {
            VitalField::Systolic => sub.systolic,
            VitalField::Diastolic => sub.diastolic,
            VitalField::HeartRate => sub.heart_rate,
        }
    }
}

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic > 180 and/or diastolic > 120)
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Hypertension Stage 1",
            BloodPressureCategory::Hypertension2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        write!(f, "{}", label)
    }
}
