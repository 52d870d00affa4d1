use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Time-of-day label for a measurement session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeOfDay {
    /// Morning measurement session
    Morning,

    /// Night measurement session
    Night,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "Morning"),
            TimeOfDay::Night => write!(f, "Night"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "night" => Ok(TimeOfDay::Night),
            other => Err(format!(
                "Time must be Morning or Night, got '{}'",
                other
            )),
        }
    }
}

/// One measurement set: a systolic/diastolic pair plus heart rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubReading {
    /// Systolic blood pressure in mmHg (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure in mmHg (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Heart rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250"))]
    pub heart_rate: u16,
}

/// One journal entry: up to two measurement sets taken in the same session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reading {
    /// Calendar day the measurement was taken, no time component
    pub date: NaiveDate,

    /// Which session of the day the entry belongs to
    pub time: TimeOfDay,

    /// First measurement set, always present
    pub first: SubReading,

    /// Second measurement set, when one was taken back to back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<SubReading>,
}

impl Reading {
    /// Iterate over the one or two measurement sets in entry order
    pub fn sub_readings(&self) -> impl Iterator<Item = &SubReading> {
        std::iter::once(&self.first).chain(self.second.as_ref())
    }

    /// Number of measurement sets in this entry (1 or 2)
    pub fn sub_reading_count(&self) -> usize {
        if self.second.is_some() {
            2
        } else {
            1
        }
    }
}

/// Request payload for appending a new reading to the journal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReadingRequest {
    /// Calendar day of the measurement; must not lie in the future
    #[validate(custom = "date_not_in_future")]
    pub date: NaiveDate,

    /// Which session of the day the entry belongs to
    pub time: TimeOfDay,

    /// First measurement set
    #[validate]
    pub first: SubReading,

    /// Optional second measurement set
    #[validate]
    pub second: Option<SubReading>,
}

impl From<CreateReadingRequest> for Reading {
    fn from(request: CreateReadingRequest) -> Self {
        Self {
            date: request.date,
            time: request.time,
            first: request.first,
            second: request.second,
        }
    }
}

/// Rejects entry dates after the local calendar day
fn date_not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Local::now().date_naive() {
        let mut error = ValidationError::new("future_date");
        error.message = Some("Date cannot be in the future".into());
        return Err(error);
    }
    Ok(())
}

/// Raw form fields as captured by an input surface, before parsing.
/// The second trio is all-or-nothing: supplying only part of it is
/// rejected during conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingForm {
    /// Entry date as YYYY-MM-DD
    pub date: String,

    /// Session label, Morning or Night (case-insensitive)
    pub time: String,

    /// First systolic value
    pub systolic: String,

    /// First diastolic value
    pub diastolic: String,

    /// First heart rate value
    pub heart_rate: String,

    /// Second systolic value, when a second set was measured
    pub second_systolic: Option<String>,

    /// Second diastolic value, when a second set was measured
    pub second_diastolic: Option<String>,

    /// Second heart rate value, when a second set was measured
    pub second_heart_rate: Option<String>,
}

/// Checks a required form field is non-empty, returning the trimmed text
fn required_field<'a>(value: &'a str, name: &str) -> Result<&'a str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("Please fill in all fields: {} is required", name));
    }
    Ok(trimmed)
}

/// Parses one numeric form field into a measurement value
fn parse_vital(value: &str, name: &str) -> Result<u16, String> {
    let text = required_field(value, name)?;
    text.parse::<u16>()
        .map_err(|_| format!("{} must be a positive whole number, got '{}'", name, text))
}

/// Treats blank optional fields the same as absent ones
fn optional_field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

impl TryFrom<ReadingForm> for CreateReadingRequest {
    type Error = String;

    /// Parse raw form text into a typed request. Parsing only; range
    /// validation happens when the request is appended to the store.
    fn try_from(form: ReadingForm) -> Result<Self, Self::Error> {
        let date_text = required_field(&form.date, "Date")?;
        let date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|_| format!("Date must be in YYYY-MM-DD format, got '{}'", date_text))?;

        let time = required_field(&form.time, "Time")?.parse::<TimeOfDay>()?;

        let first = SubReading {
            systolic: parse_vital(&form.systolic, "Systolic")?,
            diastolic: parse_vital(&form.diastolic, "Diastolic")?,
            heart_rate: parse_vital(&form.heart_rate, "Heart rate")?,
        };

        let second = match (
            optional_field(&form.second_systolic),
            optional_field(&form.second_diastolic),
            optional_field(&form.second_heart_rate),
        ) {
            (None, None, None) => None,
            (Some(systolic), Some(diastolic), Some(heart_rate)) => Some(SubReading {
                systolic: parse_vital(systolic, "Second systolic")?,
                diastolic: parse_vital(diastolic, "Second diastolic")?,
                heart_rate: parse_vital(heart_rate, "Second heart rate")?,
            }),
            _ => {
                return Err(
                    "Please fill in all fields: the second reading is incomplete".to_string()
                )
            }
        };

        Ok(CreateReadingRequest {
            date,
            time,
            first,
            second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use validator::Validate;

    fn sample_form() -> ReadingForm {
        ReadingForm {
            date: "2024-03-01".to_string(),
            time: "Morning".to_string(),
            systolic: "120".to_string(),
            diastolic: "80".to_string(),
            heart_rate: "70".to_string(),
            second_systolic: None,
            second_diastolic: None,
            second_heart_rate: None,
        }
    }

    #[test]
    fn time_of_day_parses_case_insensitively() {
        assert_eq!("morning".parse::<TimeOfDay>().unwrap(), TimeOfDay::Morning);
        assert_eq!("NIGHT".parse::<TimeOfDay>().unwrap(), TimeOfDay::Night);
        assert_eq!("  Night ".parse::<TimeOfDay>().unwrap(), TimeOfDay::Night);
    }

    #[test]
    fn time_of_day_rejects_unknown_labels() {
        let result = "noon".parse::<TimeOfDay>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Morning or Night"));
    }

    #[test]
    fn reading_serializes_with_camel_case_vitals() {
        let reading = Reading {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: TimeOfDay::Morning,
            first: SubReading {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
            },
            second: None,
        };

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["time"], "Morning");
        assert_eq!(json["first"]["heartRate"], 70);
        // A single-set entry omits the second field entirely
        assert!(json.get("second").is_none());
    }

    #[test]
    fn reading_deserializes_without_second_field() {
        let json = r#"{
            "date": "2024-03-01",
            "time": "Night",
            "first": { "systolic": 118, "diastolic": 76, "heartRate": 64 }
        }"#;

        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.time, TimeOfDay::Night);
        assert_eq!(reading.second, None);
        assert_eq!(reading.sub_reading_count(), 1);
    }

    #[test]
    fn sub_readings_iterates_both_sets_in_order() {
        let reading = Reading {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: TimeOfDay::Morning,
            first: SubReading {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
            },
            second: Some(SubReading {
                systolic: 130,
                diastolic: 85,
                heart_rate: 75,
            }),
        };

        let systolics: Vec<u16> = reading.sub_readings().map(|s| s.systolic).collect();
        assert_eq!(systolics, vec![120, 130]);
        assert_eq!(reading.sub_reading_count(), 2);
    }

    #[test]
    fn form_with_all_fields_parses() {
        let request = CreateReadingRequest::try_from(sample_form()).unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(request.time, TimeOfDay::Morning);
        assert_eq!(request.first.systolic, 120);
        assert!(request.second.is_none());
    }

    #[test]
    fn form_with_second_set_parses_both() {
        let mut form = sample_form();
        form.second_systolic = Some("130".to_string());
        form.second_diastolic = Some("85".to_string());
        form.second_heart_rate = Some("75".to_string());

        let request = CreateReadingRequest::try_from(form).unwrap();
        let second = request.second.unwrap();
        assert_eq!(second.systolic, 130);
        assert_eq!(second.heart_rate, 75);
    }

    #[test]
    fn form_with_missing_field_is_rejected() {
        let mut form = sample_form();
        form.systolic = "".to_string();

        let result = CreateReadingRequest::try_from(form);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Systolic is required"));
    }

    #[test]
    fn form_with_non_numeric_vital_is_rejected() {
        let mut form = sample_form();
        form.diastolic = "8o".to_string();

        let result = CreateReadingRequest::try_from(form);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("positive whole number"));
    }

    #[test]
    fn form_with_malformed_date_is_rejected() {
        let mut form = sample_form();
        form.date = "03/01/2024".to_string();

        let result = CreateReadingRequest::try_from(form);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("YYYY-MM-DD"));
    }

    #[test]
    fn form_with_partial_second_set_is_rejected() {
        let mut form = sample_form();
        form.second_systolic = Some("130".to_string());

        let result = CreateReadingRequest::try_from(form);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("second reading is incomplete"));
    }

    #[test]
    fn form_with_blank_second_fields_parses_as_single_set() {
        // Surfaces often submit empty strings for untouched optional fields
        let mut form = sample_form();
        form.second_systolic = Some("".to_string());
        form.second_diastolic = Some("  ".to_string());
        form.second_heart_rate = Some("".to_string());

        let request = CreateReadingRequest::try_from(form).unwrap();
        assert!(request.second.is_none());
    }

    #[test]
    fn request_with_future_date_fails_validation() {
        let request = CreateReadingRequest {
            date: Local::now().date_naive() + Duration::days(1),
            time: TimeOfDay::Morning,
            first: SubReading {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
            },
            second: None,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn request_with_today_passes_validation() {
        let request = CreateReadingRequest {
            date: Local::now().date_naive(),
            time: TimeOfDay::Night,
            first: SubReading {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
            },
            second: None,
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_with_out_of_range_vital_fails_validation() {
        // The form parser accepts any u16; range bounds apply here
        let request = CreateReadingRequest {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: TimeOfDay::Morning,
            first: SubReading {
                systolic: 350,
                diastolic: 80,
                heart_rate: 70,
            },
            second: None,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn request_validates_nested_second_set() {
        let request = CreateReadingRequest {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: TimeOfDay::Morning,
            first: SubReading {
                systolic: 120,
                diastolic: 80,
                heart_rate: 70,
            },
            second: Some(SubReading {
                systolic: 130,
                diastolic: 85,
                heart_rate: 10, // below the valid range
            }),
        };

        assert!(request.validate().is_err());
    }
}
