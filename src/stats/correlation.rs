//! Pairwise correlations
//!
//! Pearson product-moment coefficients between record fields. Degenerate
//! inputs (fewer than two pairs, zero variance) have no coefficient.

use super::round_to;
use crate::store::{NumericField, PhysiologicalRecord};
use serde::Serialize;

/// Correlations between the core fields
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CorrelationSet {
    pub hrv_vs_stress: Option<f64>,
    pub hrv_vs_age: Option<f64>,
    pub stress_vs_age: Option<f64>,
}

impl CorrelationSet {
    /// Compute all three core correlations
    pub fn compute(records: &[PhysiologicalRecord]) -> Self {
        Self {
            hrv_vs_stress: correlate(records, NumericField::Hrv, NumericField::StressScore),
            hrv_vs_age: correlate(records, NumericField::Hrv, NumericField::Age),
            stress_vs_age: correlate(records, NumericField::StressScore, NumericField::Age),
        }
    }
}

/// Pearson correlation between two fields, rounded to 3 decimals
///
/// Only records carrying both fields contribute.
pub fn correlate(
    records: &[PhysiologicalRecord],
    field_a: NumericField,
    field_b: NumericField,
) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| Some((r.value(field_a)?, r.value(field_b)?)))
        .unzip();

    pearson_correlation(&xs, &ys).map(|r| round_to(r, 3))
}

/// Calculate Pearson correlation coefficient
///
/// Returns a value between -1 and 1, or `None` when the slices differ in
/// length, hold fewer than two values, or either has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Human-readable strength of a coefficient
pub fn correlation_strength(r: f64) -> &'static str {
    let abs_r = r.abs();
    if abs_r > 0.5 {
        "strong"
    } else if abs_r > 0.3 {
        "moderate"
    } else if abs_r > 0.1 {
        "weak"
    } else {
        "negligible"
    }
}

/// "positive" or "negative"
pub fn correlation_direction(r: f64) -> &'static str {
    if r < 0.0 {
        "negative"
    } else {
        "positive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: u32, hrv: f64, stress: f64, age: u32) -> PhysiologicalRecord {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        PhysiologicalRecord::new(id, ts, hrv, stress, age)
    }

    #[test]
    fn test_pearson_correlation_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pearson_correlation_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pearson_correlation_degenerate() {
        assert_eq!(pearson_correlation(&[], &[]), None);
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), None);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[3.0]), None);
        // Zero variance in y
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
    }

    #[test]
    fn test_correlate_records() {
        let records = vec![
            record(1, 60.0, 10.0, 25),
            record(2, 50.0, 30.0, 30),
            record(3, 40.0, 50.0, 35),
        ];
        assert_eq!(
            correlate(&records, NumericField::Hrv, NumericField::StressScore),
            Some(-1.0)
        );
        // No record carries heart rate
        assert_eq!(
            correlate(&records, NumericField::Hrv, NumericField::HeartRate),
            None
        );
    }

    #[test]
    fn test_correlation_set_serializes_null() {
        let set = CorrelationSet::compute(&[record(1, 50.0, 20.0, 30)]);
        assert_eq!(set, CorrelationSet::default());

        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"hrv_vs_stress\":null"));
    }

    #[test]
    fn test_correlation_strength() {
        assert_eq!(correlation_strength(0.8), "strong");
        assert_eq!(correlation_strength(-0.55), "strong");
        assert_eq!(correlation_strength(0.4), "moderate");
        assert_eq!(correlation_strength(-0.35), "moderate");
        assert_eq!(correlation_strength(0.2), "weak");
        assert_eq!(correlation_strength(0.05), "negligible");
        assert_eq!(correlation_direction(-0.2), "negative");
    }
}
