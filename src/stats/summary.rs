//! Descriptive statistics per numeric field

use super::round_to;
use crate::store::{NumericField, PhysiologicalRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive statistics for one field over a record set
///
/// All values are rounded to 2 decimals. An empty input yields `count = 0`
/// with every other field `None`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StatSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); `None` below two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl StatSummary {
    /// Summarize raw values
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            count: values.len(),
            mean: mean(values).map(|m| round_to(m, 2)),
            std: sample_std(values).map(|s| round_to(s, 2)),
            min: sorted.first().map(|v| round_to(*v, 2)),
            max: sorted.last().map(|v| round_to(*v, 2)),
            median: median_sorted(&sorted).map(|m| round_to(m, 2)),
        }
    }

    /// Check if no values were summarized
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize each requested field over the records
///
/// Records lacking an optional field are skipped for that field only.
pub fn summarize(
    records: &[PhysiologicalRecord],
    fields: &[NumericField],
) -> BTreeMap<NumericField, StatSummary> {
    fields
        .iter()
        .map(|&field| {
            let values = field_values(records, field);
            (field, StatSummary::from_values(&values))
        })
        .collect()
}

/// Present values of a field, in record order
pub fn field_values(records: &[PhysiologicalRecord], field: NumericField) -> Vec<f64> {
    records.iter().filter_map(|r| r.value(field)).collect()
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (Bessel-corrected)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        None
    } else if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}
