//! Semantic bucketing of records
//!
//! A classifier assigns every record to exactly one label, so the buckets of
//! a `BucketedSummary` partition the input set.

use super::round_to;
use super::summary::{mean, sample_std};
use crate::store::{NumericField, PhysiologicalRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Record classifiers used for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// `< 20` Low, `20..=35` Medium, `> 35` High
    StressLevel,
    /// `< 30` Young, `30..=35` Middle, `> 35` Senior
    AgeGroup,
}

impl Classifier {
    /// Labels in display order
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Classifier::StressLevel => &["Low", "Medium", "High"],
            Classifier::AgeGroup => &["Young", "Middle", "Senior"],
        }
    }

    /// Bucket label for a record
    pub fn classify(&self, record: &PhysiologicalRecord) -> &'static str {
        match self {
            Classifier::StressLevel => stress_level(record.stress_score),
            Classifier::AgeGroup => age_group(record.age),
        }
    }
}

/// Stress label for a score
pub fn stress_level(score: f64) -> &'static str {
    if score < 20.0 {
        "Low"
    } else if score <= 35.0 {
        "Medium"
    } else {
        "High"
    }
}

/// Age group label
pub fn age_group(age: u32) -> &'static str {
    if age < 30 {
        "Young"
    } else if age <= 35 {
        "Middle"
    } else {
        "Senior"
    }
}

/// Aggregate of one field within a bucket
///
/// `count` is the number of records assigned to the bucket. The aggregates
/// cover only the records that carry the field, and are `None` when none do.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    pub count: usize,
    pub average: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One labelled bucket
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: &'static str,
    pub stats: BucketStats,
}

/// Field aggregates grouped by classifier label
///
/// Serializes as a map from label to
/// `{count, average_<field>, std, min, max}`, in classifier order. Labels
/// without members are omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSummary {
    pub classifier: Classifier,
    pub field: NumericField,
    pub buckets: Vec<Bucket>,
}

impl BucketedSummary {
    /// Look up a bucket by label
    pub fn get(&self, label: &str) -> Option<&BucketStats> {
        self.buckets.iter().find(|b| b.label == label).map(|b| &b.stats)
    }

    /// Total records across all buckets
    pub fn total_count(&self) -> usize {
        self.buckets.iter().map(|b| b.stats.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Group records by classifier and aggregate `field` per bucket
pub fn bucket_by(
    records: &[PhysiologicalRecord],
    classifier: Classifier,
    field: NumericField,
) -> BucketedSummary {
    let buckets = classifier
        .labels()
        .iter()
        .filter_map(|&label| {
            let members: Vec<&PhysiologicalRecord> = records
                .iter()
                .filter(|r| classifier.classify(r) == label)
                .collect();
            if members.is_empty() {
                return None;
            }

            let values: Vec<f64> = members.iter().filter_map(|r| r.value(field)).collect();
            let min = values.iter().copied().reduce(f64::min);
            let max = values.iter().copied().reduce(f64::max);

            Some(Bucket {
                label,
                stats: BucketStats {
                    count: members.len(),
                    average: mean(&values).map(|m| round_to(m, 2)),
                    std: sample_std(&values).map(|s| round_to(s, 2)),
                    min: min.map(|v| round_to(v, 2)),
                    max: max.map(|v| round_to(v, 2)),
                },
            })
        })
        .collect();

    BucketedSummary {
        classifier,
        field,
        buckets,
    }
}

struct BucketEntry<'a> {
    field: NumericField,
    stats: &'a BucketStats,
}

impl Serialize for BucketEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("count", &self.stats.count)?;
        map.serialize_entry(&format!("average_{}", self.field.name()), &self.stats.average)?;
        map.serialize_entry("std", &self.stats.std)?;
        map.serialize_entry("min", &self.stats.min)?;
        map.serialize_entry("max", &self.stats.max)?;
        map.end()
    }
}

impl Serialize for BucketedSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(
                bucket.label,
                &BucketEntry {
                    field: self.field,
                    stats: &bucket.stats,
                },
            )?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const STRESS: [f64; 15] = [
        25.0, 15.0, 45.0, 10.0, 30.0, 20.0, 50.0, 12.0, 35.0, 18.0, 55.0, 22.0, 28.0, 8.0, 40.0,
    ];
    const AGES: [u32; 15] = [28, 32, 25, 35, 30, 27, 22, 38, 29, 33, 26, 31, 34, 40, 24];

    fn records() -> Vec<PhysiologicalRecord> {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        (0..15)
            .map(|i| {
                PhysiologicalRecord::new(i as u32 + 1, ts, 40.0 + i as f64, STRESS[i], AGES[i])
            })
            .collect()
    }

    #[test]
    fn test_stress_boundaries() {
        assert_eq!(stress_level(19.99), "Low");
        assert_eq!(stress_level(20.0), "Medium");
        assert_eq!(stress_level(35.0), "Medium");
        assert_eq!(stress_level(35.01), "High");
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(age_group(29), "Young");
        assert_eq!(age_group(30), "Middle");
        assert_eq!(age_group(35), "Middle");
        assert_eq!(age_group(36), "Senior");
    }

    #[test]
    fn test_buckets_partition_records() {
        let records = records();
        for classifier in [Classifier::StressLevel, Classifier::AgeGroup] {
            let summary = bucket_by(&records, classifier, NumericField::Hrv);
            assert_eq!(summary.total_count(), records.len());
        }
    }

    #[test]
    fn test_stress_bucket_membership() {
        let summary = bucket_by(&records(), Classifier::StressLevel, NumericField::Hrv);

        // 15, 10, 12, 18, 8
        assert_eq!(summary.get("Low").unwrap().count, 5);
        // 25, 30, 20, 35, 22, 28 (20 lands in Medium)
        assert_eq!(summary.get("Medium").unwrap().count, 6);
        // 45, 50, 55, 40
        assert_eq!(summary.get("High").unwrap().count, 4);
    }

    #[test]
    fn test_empty_buckets_are_omitted() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let records = vec![PhysiologicalRecord::new(1, ts, 50.0, 10.0, 25)];
        let summary = bucket_by(&records, Classifier::StressLevel, NumericField::Hrv);

        assert_eq!(summary.buckets.len(), 1);
        assert!(summary.get("High").is_none());
        assert_eq!(summary.get("Low").unwrap().std, None);

        assert!(bucket_by(&[], Classifier::AgeGroup, NumericField::Hrv).is_empty());
    }

    #[test]
    fn test_partition_holds_for_optional_field() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let records = vec![
            PhysiologicalRecord::new(1, ts, 60.0, 10.0, 25).heart_rate(58.0),
            PhysiologicalRecord::new(2, ts, 50.0, 25.0, 31),
            PhysiologicalRecord::new(3, ts, 40.0, 50.0, 40),
        ];
        let summary = bucket_by(&records, Classifier::StressLevel, NumericField::HeartRate);

        assert_eq!(summary.total_count(), records.len());
        assert_eq!(summary.buckets.len(), 3);

        let low = summary.get("Low").unwrap();
        assert_eq!(low.count, 1);
        assert_eq!(low.average, Some(58.0));
        assert_eq!(low.min, Some(58.0));

        let high = summary.get("High").unwrap();
        assert_eq!(high.count, 1);
        assert_eq!(high.average, None);
        assert_eq!(high.max, None);
    }

    #[test]
    fn test_serializes_in_label_order() {
        let summary = bucket_by(&records(), Classifier::StressLevel, NumericField::Hrv);
        let json = serde_json::to_string(&summary).unwrap();

        let low = json.find("\"Low\"").unwrap();
        let medium = json.find("\"Medium\"").unwrap();
        let high = json.find("\"High\"").unwrap();
        assert!(low < medium && medium < high);
        assert!(json.contains("\"average_hrv\""));
    }
}
