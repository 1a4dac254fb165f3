//! Statistics Engine
//!
//! Pure computations over a batch of physiological records:
//!
//! - **summary**: Per-field descriptive statistics
//! - **buckets**: Stress-level and age-group bucketing
//! - **correlation**: Pearson correlations between fields
//! - **insights**: Deterministic rule-based insight strings
//!
//! Nothing here fails. Empty or degenerate input produces zero-count
//! summaries and `None` correlations, which downstream stages render as
//! placeholders.

pub mod buckets;
pub mod correlation;
pub mod insights;
pub mod summary;

pub use buckets::{bucket_by, Bucket, BucketStats, BucketedSummary, Classifier};
pub use correlation::{correlate, pearson_correlation, CorrelationSet};
pub use insights::{generate_insights, InsightInputs, MAX_INSIGHTS};
pub use summary::{summarize, StatSummary};

use crate::store::{NumericField, PhysiologicalRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the statistics stage produces for one request
#[derive(Debug, Clone, Serialize)]
pub struct StatsBundle {
    pub data_summary: DataSummary,
    pub statistics: BTreeMap<NumericField, StatSummary>,
    pub hrv_by_stress_level: BucketedSummary,
    pub hrv_by_age_group: BucketedSummary,
    pub correlations: CorrelationSet,
    pub insights: Vec<String>,
    /// Source records, kept for charting
    #[serde(skip)]
    pub records: Vec<PhysiologicalRecord>,
}

impl StatsBundle {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Mean of a field, if any value was present
    pub fn mean(&self, field: NumericField) -> Option<f64> {
        self.statistics.get(&field).and_then(|s| s.mean)
    }
}

/// Shape of the analyzed record set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataSummary {
    pub total_records: usize,
    /// Fields with at least one value
    pub fields: Vec<NumericField>,
}

/// Stateless statistics stage
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run every computation over the records
    ///
    /// Extended fields are summarized only when at least one record has
    /// them.
    pub fn analyze(&self, records: Vec<PhysiologicalRecord>) -> StatsBundle {
        let mut fields: Vec<NumericField> = NumericField::core().to_vec();
        fields.extend(
            NumericField::extended()
                .iter()
                .copied()
                .filter(|&f| records.iter().any(|r| r.value(f).is_some())),
        );

        let statistics = self.summarize(&records, &fields);
        let hrv_by_stress_level = self.bucket_by(&records, Classifier::StressLevel, NumericField::Hrv);
        let hrv_by_age_group = self.bucket_by(&records, Classifier::AgeGroup, NumericField::Hrv);
        let correlations = CorrelationSet::compute(&records);

        let insights = generate_insights(&InsightInputs {
            record_count: records.len(),
            statistics: &statistics,
            hrv_by_stress: &hrv_by_stress_level,
            hrv_by_age: &hrv_by_age_group,
            correlations: &correlations,
        });

        let present: Vec<NumericField> = if records.is_empty() {
            Vec::new()
        } else {
            fields
        };

        tracing::debug!(
            records = records.len(),
            insights = insights.len(),
            hrv_vs_stress = ?correlations.hrv_vs_stress,
            "Computed statistics bundle"
        );

        StatsBundle {
            data_summary: DataSummary {
                total_records: records.len(),
                fields: present,
            },
            statistics,
            hrv_by_stress_level,
            hrv_by_age_group,
            correlations,
            insights,
            records,
        }
    }

    /// Descriptive statistics per field
    pub fn summarize(
        &self,
        records: &[PhysiologicalRecord],
        fields: &[NumericField],
    ) -> BTreeMap<NumericField, StatSummary> {
        summarize(records, fields)
    }

    /// Group records and aggregate one field per bucket
    pub fn bucket_by(
        &self,
        records: &[PhysiologicalRecord],
        classifier: Classifier,
        field: NumericField,
    ) -> BucketedSummary {
        bucket_by(records, classifier, field)
    }

    /// Pearson correlation between two fields
    pub fn correlate(
        &self,
        records: &[PhysiologicalRecord],
        field_a: NumericField,
        field_b: NumericField,
    ) -> Option<f64> {
        correlate(records, field_a, field_b)
    }
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    fn sample_records() -> Vec<PhysiologicalRecord> {
        let store = InMemoryStore::sample(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
        let window = crate::store::DayWindow::ending(store.latest_date().unwrap(), 30).unwrap();
        store.records_in(&window)
    }

    #[test]
    fn test_analyze_sample_dataset() {
        let bundle = StatisticsEngine::new().analyze(sample_records());

        assert_eq!(bundle.record_count(), 15);
        assert_eq!(bundle.data_summary.total_records, 15);
        assert_eq!(bundle.data_summary.fields.len(), 7);
        assert_eq!(bundle.statistics[&NumericField::Hrv].count, 15);
        assert_eq!(bundle.mean(NumericField::Hrv), Some(50.28));
        assert_eq!(bundle.hrv_by_stress_level.total_count(), 15);
        assert_eq!(bundle.hrv_by_age_group.total_count(), 15);

        let r = bundle.correlations.hrv_vs_stress.unwrap();
        assert!(r < -0.9, "HRV and stress should be strongly negative, got {}", r);
        assert!(bundle.insights.len() <= MAX_INSIGHTS);
    }

    #[test]
    fn test_analyze_empty() {
        let bundle = StatisticsEngine::new().analyze(Vec::new());

        assert_eq!(bundle.record_count(), 0);
        assert!(bundle.data_summary.fields.is_empty());
        assert_eq!(bundle.statistics.len(), 3);
        assert!(bundle.hrv_by_stress_level.is_empty());
        assert_eq!(bundle.correlations, CorrelationSet::default());
        assert_eq!(bundle.insights.len(), 1);
    }

    #[test]
    fn test_bundle_serialization_skips_records() {
        let bundle = StatisticsEngine::new().analyze(sample_records());
        let json = serde_json::to_value(&bundle).unwrap();

        assert!(json.get("records").is_none());
        assert!(json["statistics"]["stress_score"]["mean"].is_number());
        assert_eq!(json["hrv_by_stress_level"]["Medium"]["count"], 6);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.9126, 3), -0.913);
    }
}
