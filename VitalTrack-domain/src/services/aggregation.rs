use chrono::NaiveDate;

use crate::entities::{BloodPressureCategory, ChartPoint, DailyAverage, VitalField};
use vital_track_data::models::Reading;

/// Mean of every measurement set recorded on the given day.
///
/// Entries with two sets contribute both independently: values are summed
/// across all sets for the day and divided by the total set count, then
/// rounded once, half away from zero. A day with no matching readings
/// yields the zero average rather than an error.
pub fn daily_average(readings: &[Reading], date: NaiveDate) -> DailyAverage {
    let mut systolic_sum: u32 = 0;
    let mut diastolic_sum: u32 = 0;
    let mut heart_rate_sum: u32 = 0;
    let mut count: u32 = 0;

    for reading in readings.iter().filter(|r| r.date == date) {
        for sub in reading.sub_readings() {
            systolic_sum += u32::from(sub.systolic);
            diastolic_sum += u32::from(sub.diastolic);
            heart_rate_sum += u32::from(sub.heart_rate);
            count += 1;
        }
    }

    if count == 0 {
        return DailyAverage::ZERO;
    }

    DailyAverage {
        systolic: round_mean(systolic_sum, count),
        diastolic: round_mean(diastolic_sum, count),
        heart_rate: round_mean(heart_rate_sum, count),
    }
}

/// Map every journal entry to a chart-ready point, preserving journal
/// order. The chart surface renders the unrounded average fields for
/// entries with two measurement sets.
pub fn chart_series(readings: &[Reading]) -> Vec<ChartPoint> {
    readings.iter().map(chart_point).collect()
}

fn chart_point(reading: &Reading) -> ChartPoint {
    let first = reading.first;
    let second = reading.second;

    ChartPoint {
        name: format!("{} - {}", reading.time, reading.date),
        systolic: first.systolic,
        diastolic: first.diastolic,
        heart_rate: first.heart_rate,
        second_systolic: second.map(|s| s.systolic),
        second_diastolic: second.map(|s| s.diastolic),
        second_heart_rate: second.map(|s| s.heart_rate),
        avg_systolic: second.map(|s| mean_of(first.systolic, s.systolic)),
        avg_diastolic: second.map(|s| mean_of(first.diastolic, s.diastolic)),
        avg_heart_rate: second.map(|s| mean_of(first.heart_rate, s.heart_rate)),
    }
}

/// Rounded mean of one field across an entry's measurement sets, for
/// list-style display. Single-set entries return the raw value.
pub fn combined_value(reading: &Reading, field: VitalField) -> u16 {
    match reading.second {
        Some(second) => {
            let sum = u32::from(field.of(&reading.first)) + u32::from(field.of(&second));
            round_mean(sum, 2)
        }
        None => field.of(&reading.first),
    }
}

/// Categorize a blood pressure pair using the standard clinical bands
pub fn categorize(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// Divide once as floating point and round half away from zero
fn round_mean(sum: u32, count: u32) -> u16 {
    (f64::from(sum) / f64::from(count)).round() as u16
}

/// Unrounded mean of one vital across a measurement pair
fn mean_of(a: u16, b: u16) -> f64 {
    f64::from(u32::from(a) + u32::from(b)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use vital_track_data::models::{SubReading, TimeOfDay};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sub(systolic: u16, diastolic: u16, heart_rate: u16) -> SubReading {
        SubReading {
            systolic,
            diastolic,
            heart_rate,
        }
    }

    fn single(d: u32, time: TimeOfDay, first: SubReading) -> Reading {
        Reading {
            date: day(d),
            time,
            first,
            second: None,
        }
    }

    fn double(d: u32, time: TimeOfDay, first: SubReading, second: SubReading) -> Reading {
        Reading {
            date: day(d),
            time,
            first,
            second: Some(second),
        }
    }

    #[test]
    fn daily_average_of_empty_journal_is_zero() {
        assert_eq!(daily_average(&[], day(1)), DailyAverage::ZERO);
    }

    #[test]
    fn daily_average_with_no_matching_date_is_zero() {
        let readings = vec![single(1, TimeOfDay::Morning, sub(120, 80, 70))];
        assert_eq!(daily_average(&readings, day(2)), DailyAverage::ZERO);
    }

    #[test]
    fn daily_average_rounds_half_away_from_zero() {
        // (120+130)/2 = 125, (80+85)/2 = 82.5 -> 83, (70+75)/2 = 72.5 -> 73
        let readings = vec![
            single(1, TimeOfDay::Morning, sub(120, 80, 70)),
            single(1, TimeOfDay::Night, sub(130, 85, 75)),
        ];

        let average = daily_average(&readings, day(1));
        assert_eq!(average.systolic, 125);
        assert_eq!(average.diastolic, 83);
        assert_eq!(average.heart_rate, 73);
    }

    #[test]
    fn daily_average_counts_each_measurement_set() {
        // Three sets on the day: (120+130+140)/3 = 130,
        // (80+85+95)/3 = 86.67 -> 87, (70+75+85)/3 = 76.67 -> 77
        let readings = vec![
            single(1, TimeOfDay::Morning, sub(120, 80, 70)),
            double(1, TimeOfDay::Night, sub(130, 85, 75), sub(140, 95, 85)),
        ];

        let average = daily_average(&readings, day(1));
        assert_eq!(average.systolic, 130);
        assert_eq!(average.diastolic, 87);
        assert_eq!(average.heart_rate, 77);
    }

    #[test]
    fn daily_average_ignores_other_days() {
        let readings = vec![
            single(1, TimeOfDay::Morning, sub(120, 80, 70)),
            single(2, TimeOfDay::Morning, sub(200, 120, 110)),
        ];

        let average = daily_average(&readings, day(1));
        assert_eq!(average.systolic, 120);
        assert_eq!(average.diastolic, 80);
        assert_eq!(average.heart_rate, 70);
    }

    #[test]
    fn chart_series_preserves_journal_order_and_labels() {
        let readings = vec![
            single(1, TimeOfDay::Morning, sub(120, 80, 70)),
            single(1, TimeOfDay::Night, sub(118, 76, 64)),
        ];

        let series = chart_series(&readings);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Morning - 2024-03-01");
        assert_eq!(series[1].name, "Night - 2024-03-01");
        assert_eq!(series[1].systolic, 118);
    }

    #[test]
    fn chart_series_single_set_entry_has_no_averages() {
        let readings = vec![single(1, TimeOfDay::Morning, sub(120, 80, 70))];

        let point = &chart_series(&readings)[0];
        assert_eq!(point.second_systolic, None);
        assert_eq!(point.avg_systolic, None);
        assert_eq!(point.avg_heart_rate, None);
    }

    #[test]
    fn chart_series_carries_unrounded_averages() {
        let readings = vec![double(
            1,
            TimeOfDay::Morning,
            sub(120, 80, 70),
            sub(130, 85, 75),
        )];

        let point = &chart_series(&readings)[0];
        assert_eq!(point.second_systolic, Some(130));
        assert_eq!(point.avg_systolic, Some(125.0));
        assert_eq!(point.avg_diastolic, Some(82.5));
        assert_eq!(point.avg_heart_rate, Some(72.5));
    }

    #[test]
    fn chart_point_serializes_with_camel_case_fields() {
        let readings = vec![double(
            1,
            TimeOfDay::Morning,
            sub(120, 80, 70),
            sub(130, 85, 75),
        )];

        let json = serde_json::to_value(&chart_series(&readings)[0]).unwrap();
        assert_eq!(json["name"], "Morning - 2024-03-01");
        assert_eq!(json["heartRate"], 70);
        assert_eq!(json["secondSystolic"], 130);
        assert_eq!(json["avgDiastolic"], 82.5);
    }

    #[test]
    fn combined_value_rounds_the_pair_mean() {
        let reading = double(1, TimeOfDay::Morning, sub(120, 80, 70), sub(130, 85, 75));

        assert_eq!(combined_value(&reading, VitalField::Systolic), 125);
        assert_eq!(combined_value(&reading, VitalField::Diastolic), 83);
        assert_eq!(combined_value(&reading, VitalField::HeartRate), 73);
    }

    #[test]
    fn combined_value_of_single_set_is_the_raw_value() {
        let reading = single(1, TimeOfDay::Night, sub(118, 76, 64));

        assert_eq!(combined_value(&reading, VitalField::Systolic), 118);
        assert_eq!(combined_value(&reading, VitalField::Diastolic), 76);
        assert_eq!(combined_value(&reading, VitalField::HeartRate), 64);
    }

    #[test]
    fn categorize_normal() {
        assert_eq!(categorize(110, 75), BloodPressureCategory::Normal);
    }

    #[test]
    fn categorize_elevated() {
        assert_eq!(categorize(125, 75), BloodPressureCategory::Elevated);
    }

    #[test]
    fn categorize_hypertension_stage_1() {
        // Systolic in range
        assert_eq!(categorize(135, 75), BloodPressureCategory::Hypertension1);

        // Diastolic in range
        assert_eq!(categorize(120, 85), BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn categorize_hypertension_stage_2() {
        // Systolic in range
        assert_eq!(categorize(145, 75), BloodPressureCategory::Hypertension2);

        // Diastolic in range
        assert_eq!(categorize(120, 95), BloodPressureCategory::Hypertension2);
    }

    #[test]
    fn categorize_hypertensive_crisis() {
        // Systolic in range
        assert_eq!(categorize(185, 75), BloodPressureCategory::HypertensiveCrisis);

        // Diastolic in range
        assert_eq!(categorize(120, 125), BloodPressureCategory::HypertensiveCrisis);
    }
}
