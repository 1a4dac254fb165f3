//! Core record types for the insight pipeline
//!
//! - `PhysiologicalRecord`: one HRV + stress reading
//! - `NumericField`: the numeric columns a record exposes
//! - `DayWindow`: an inclusive range of calendar days

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single physiological reading
///
/// Records are immutable once produced by a store and are ordered by
/// `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhysiologicalRecord {
    /// Stable identifier within the snapshot
    pub id: u32,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Heart-rate variability (RMSSD, ms)
    pub hrv: f64,
    /// Stress score on a 0-100 scale
    pub stress_score: f64,
    /// Age of the person at the time of the reading
    pub age: u32,
    /// Standard deviation of NN intervals (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdnn: Option<f64>,
    /// Percentage of successive NN intervals differing by more than 50 ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnn50: Option<f64>,
    /// Heart rate (bpm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    /// Breaths per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
}

impl PhysiologicalRecord {
    /// Create a record with the required fields
    pub fn new(id: u32, timestamp: DateTime<Utc>, hrv: f64, stress_score: f64, age: u32) -> Self {
        Self {
            id,
            timestamp,
            hrv,
            stress_score,
            age,
            sdnn: None,
            pnn50: None,
            heart_rate: None,
            respiratory_rate: None,
        }
    }

    /// Builder: set SDNN
    pub fn sdnn(mut self, sdnn: f64) -> Self {
        self.sdnn = Some(sdnn);
        self
    }

    /// Builder: set pNN50
    pub fn pnn50(mut self, pnn50: f64) -> Self {
        self.pnn50 = Some(pnn50);
        self
    }

    /// Builder: set heart rate
    pub fn heart_rate(mut self, bpm: f64) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    /// Builder: set respiratory rate
    pub fn respiratory_rate(mut self, rate: f64) -> Self {
        self.respiratory_rate = Some(rate);
        self
    }

    /// Calendar day (UTC) of this reading
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Value of a numeric field, if the record carries it
    pub fn value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Hrv => Some(self.hrv),
            NumericField::StressScore => Some(self.stress_score),
            NumericField::Age => Some(self.age as f64),
            NumericField::Sdnn => self.sdnn,
            NumericField::Pnn50 => self.pnn50,
            NumericField::HeartRate => self.heart_rate,
            NumericField::RespiratoryRate => self.respiratory_rate,
        }
    }
}

/// Numeric columns available on a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Hrv,
    StressScore,
    Age,
    Sdnn,
    Pnn50,
    HeartRate,
    RespiratoryRate,
}

impl NumericField {
    /// Fields every record carries
    pub fn core() -> &'static [NumericField] {
        &[NumericField::Hrv, NumericField::StressScore, NumericField::Age]
    }

    /// Optional fields a source may populate
    pub fn extended() -> &'static [NumericField] {
        &[
            NumericField::Sdnn,
            NumericField::Pnn50,
            NumericField::HeartRate,
            NumericField::RespiratoryRate,
        ]
    }

    /// Column name as it appears in payloads
    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Hrv => "hrv",
            NumericField::StressScore => "stress_score",
            NumericField::Age => "age",
            NumericField::Sdnn => "sdnn",
            NumericField::Pnn50 => "pnn50",
            NumericField::HeartRate => "heart_rate",
            NumericField::RespiratoryRate => "respiratory_rate",
        }
    }

    /// Human-readable label for chart axes and layer metrics
    pub fn label(&self) -> &'static str {
        match self {
            NumericField::Hrv => "HRV",
            NumericField::StressScore => "Stress Score",
            NumericField::Age => "Age",
            NumericField::Sdnn => "SDNN",
            NumericField::Pnn50 => "pNN50",
            NumericField::HeartRate => "Heart Rate",
            NumericField::RespiratoryRate => "Respiratory Rate",
        }
    }

    /// Unit of measurement, empty for unitless scores
    pub fn unit(&self) -> &'static str {
        match self {
            NumericField::Hrv | NumericField::Sdnn => "ms",
            NumericField::StressScore => "",
            NumericField::Age => "years",
            NumericField::Pnn50 => "%",
            NumericField::HeartRate => "bpm",
            NumericField::RespiratoryRate => "br/min",
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayWindow {
    /// The `days` calendar days ending on `end` (inclusive)
    ///
    /// Returns `None` for a zero-length window.
    pub fn ending(end: NaiveDate, days: u32) -> Option<Self> {
        if days == 0 {
            return None;
        }
        let start = end - Duration::days(days as i64 - 1);
        Some(Self { start, end })
    }

    /// Check if a date falls within this window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_record_builder_and_values() {
        let record = PhysiologicalRecord::new(1, ts(1, 8), 45.2, 25.0, 28)
            .heart_rate(64.0)
            .sdnn(52.0);

        assert_eq!(record.value(NumericField::Hrv), Some(45.2));
        assert_eq!(record.value(NumericField::Age), Some(28.0));
        assert_eq!(record.value(NumericField::HeartRate), Some(64.0));
        assert_eq!(record.value(NumericField::Pnn50), None);
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_record_serialization_skips_missing_fields() {
        let record = PhysiologicalRecord::new(3, ts(2, 20), 38.5, 45.0, 25);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"stress_score\":45.0"));
        assert!(!json.contains("heart_rate"));

        let back: PhysiologicalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_field_names_match_serde() {
        for field in NumericField::core().iter().chain(NumericField::extended()) {
            let json = serde_json::to_string(field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.name()));
        }
    }

    #[test]
    fn test_day_window() {
        let end = NaiveDate::from_ymd_opt(2024, 7, 7).unwrap();
        let window = DayWindow::ending(end, 3).unwrap();

        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 7, 5).unwrap());
        assert!(window.contains(end));
        assert!(window.contains(window.start));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()));

        assert!(DayWindow::ending(end, 0).is_none());
    }
}
