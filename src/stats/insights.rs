//! Rule-based insight generation
//!
//! Each rule is a pure function of the computed summaries. Rules run in a
//! fixed order and the result is capped at [`MAX_INSIGHTS`].

use super::buckets::BucketedSummary;
use super::correlation::{correlation_direction, correlation_strength, CorrelationSet};
use super::summary::StatSummary;
use crate::store::NumericField;
use std::collections::BTreeMap;

/// Maximum insights reported per analysis
pub const MAX_INSIGHTS: usize = 5;

/// Minimum HRV gap (ms) between two buckets worth mentioning
pub const BUCKET_GAP_THRESHOLD: f64 = 1.0;

/// Inputs the rules read from
pub struct InsightInputs<'a> {
    pub record_count: usize,
    pub statistics: &'a BTreeMap<NumericField, StatSummary>,
    pub hrv_by_stress: &'a BucketedSummary,
    pub hrv_by_age: &'a BucketedSummary,
    pub correlations: &'a CorrelationSet,
}

/// Apply every rule in order and keep the first [`MAX_INSIGHTS`]
pub fn generate_insights(inputs: &InsightInputs<'_>) -> Vec<String> {
    let rules: [fn(&InsightInputs<'_>) -> Option<String>; 6] = [
        average_hrv,
        stress_contrast,
        age_contrast,
        hrv_stress_correlation,
        hrv_age_correlation,
        completion,
    ];

    rules
        .iter()
        .filter_map(|rule| rule(inputs))
        .take(MAX_INSIGHTS)
        .collect()
}

fn average_hrv(inputs: &InsightInputs<'_>) -> Option<String> {
    let mean = inputs.statistics.get(&NumericField::Hrv)?.mean?;
    Some(format!("Average HRV across all records: {:.2} ms", mean))
}

fn stress_contrast(inputs: &InsightInputs<'_>) -> Option<String> {
    bucket_contrast(inputs.hrv_by_stress, "Low", "High", "stress")
}

fn age_contrast(inputs: &InsightInputs<'_>) -> Option<String> {
    bucket_contrast(inputs.hrv_by_age, "Young", "Senior", "age group")
}

fn bucket_contrast(
    summary: &BucketedSummary,
    first: &str,
    second: &str,
    noun: &str,
) -> Option<String> {
    let a = summary.get(first)?.average?;
    let b = summary.get(second)?.average?;
    if (a - b).abs() <= BUCKET_GAP_THRESHOLD {
        return None;
    }
    let relation = if a > b { "higher" } else { "lower" };
    Some(format!(
        "Average HRV for {} {} ({:.2}) is {} than {} {} ({:.2})",
        first, noun, a, relation, second, noun, b
    ))
}

fn hrv_stress_correlation(inputs: &InsightInputs<'_>) -> Option<String> {
    let r = inputs.correlations.hrv_vs_stress?;
    if r.abs() <= 0.3 {
        return None;
    }
    Some(format!(
        "{} {} correlation ({:.3}) between HRV and stress score",
        capitalize(correlation_strength(r)),
        correlation_direction(r),
        r
    ))
}

fn hrv_age_correlation(inputs: &InsightInputs<'_>) -> Option<String> {
    let r = inputs.correlations.hrv_vs_age?;
    if r.abs() <= 0.5 {
        return None;
    }
    Some(format!(
        "Strong {} correlation ({:.3}) between HRV and age",
        correlation_direction(r),
        r
    ))
}

fn completion(inputs: &InsightInputs<'_>) -> Option<String> {
    Some(format!(
        "Analysis completed on {} records",
        inputs.record_count
    ))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::buckets::{bucket_by, Classifier};
    use crate::stats::summary::summarize;
    use crate::store::PhysiologicalRecord;
    use chrono::{TimeZone, Utc};

    fn records(rows: &[(f64, f64, u32)]) -> Vec<PhysiologicalRecord> {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(hrv, stress, age))| {
                PhysiologicalRecord::new(i as u32 + 1, ts, hrv, stress, age)
            })
            .collect()
    }

    fn run(records: &[PhysiologicalRecord]) -> Vec<String> {
        let statistics = summarize(records, NumericField::core());
        let hrv_by_stress = bucket_by(records, Classifier::StressLevel, NumericField::Hrv);
        let hrv_by_age = bucket_by(records, Classifier::AgeGroup, NumericField::Hrv);
        let correlations = CorrelationSet::compute(records);
        generate_insights(&InsightInputs {
            record_count: records.len(),
            statistics: &statistics,
            hrv_by_stress: &hrv_by_stress,
            hrv_by_age: &hrv_by_age,
            correlations: &correlations,
        })
    }

    #[test]
    fn test_all_rules_fire_and_cap_applies() {
        // Young + low stress -> high HRV; senior + high stress -> low HRV
        let records = records(&[
            (65.0, 10.0, 25),
            (60.0, 15.0, 26),
            (50.0, 28.0, 32),
            (40.0, 45.0, 40),
            (35.0, 50.0, 42),
        ]);
        let insights = run(&records);

        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(insights[0], "Average HRV across all records: 50.00 ms");
        assert!(insights[1].starts_with("Average HRV for Low stress (62.50) is higher"));
        assert!(insights[2].starts_with("Average HRV for Young age group"));
        assert!(insights[3].starts_with("Strong negative correlation"));
        assert!(insights[4].starts_with("Strong negative correlation"));
        assert!(insights[4].ends_with("between HRV and age"));
    }

    #[test]
    fn test_empty_records() {
        let insights = run(&[]);
        assert_eq!(insights, vec!["Analysis completed on 0 records".to_string()]);
    }

    #[test]
    fn test_small_gap_is_skipped() {
        let records = records(&[(50.0, 10.0, 30), (50.5, 40.0, 31)]);
        let insights = run(&records);
        assert!(!insights.iter().any(|i| i.contains("Low stress")));
    }

    #[test]
    fn test_deterministic() {
        let records = records(&[(45.0, 25.0, 28), (52.0, 15.0, 32), (38.0, 45.0, 25)]);
        assert_eq!(run(&records), run(&records));
    }
}
