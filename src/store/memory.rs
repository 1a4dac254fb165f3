//! In-memory snapshot store
//!
//! Holds a fixed, chronologically sorted set of records. The trailing
//! window is anchored at the calendar day of the newest record, so the same
//! snapshot always yields the same window regardless of wall-clock time.

use super::error::{StoreError, StoreResult};
use super::types::{DayWindow, PhysiologicalRecord};
use super::TimeSeriesStore;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

// Development dataset: id, hrv, stress_score, age.
const SAMPLE_HRV: [f64; 15] = [
    45.2, 52.8, 38.5, 61.3, 49.7, 55.1, 42.9, 58.6, 48.3, 53.7, 40.1, 56.4, 47.2, 59.8, 44.6,
];
const SAMPLE_STRESS: [f64; 15] = [
    25.0, 15.0, 45.0, 10.0, 30.0, 20.0, 50.0, 12.0, 35.0, 18.0, 55.0, 22.0, 28.0, 8.0, 40.0,
];
const SAMPLE_AGE: [u32; 15] = [28, 32, 25, 35, 30, 27, 22, 38, 29, 33, 26, 31, 34, 40, 24];

// Extended signals for the same readings.
const SAMPLE_SDNN: [f64; 15] = [
    58.1, 66.4, 49.2, 74.0, 61.5, 68.9, 53.3, 71.2, 60.4, 67.0, 50.8, 69.7, 59.6, 72.5, 55.9,
];
const SAMPLE_PNN50: [f64; 15] = [
    18.4, 24.9, 12.6, 31.2, 21.0, 26.3, 14.8, 29.5, 19.7, 25.1, 13.2, 27.8, 18.9, 30.4, 16.1,
];
const SAMPLE_HEART_RATE: [f64; 15] = [
    68.0, 62.0, 76.0, 58.0, 70.0, 64.0, 79.0, 60.0, 72.0, 63.0, 81.0, 65.0, 69.0, 57.0, 74.0,
];
const SAMPLE_RESPIRATORY_RATE: [f64; 15] = [
    14.0, 13.0, 16.0, 12.0, 14.5, 13.0, 17.0, 12.5, 15.0, 13.0, 18.0, 13.5, 14.0, 12.0, 16.5,
];

/// Read-only store over an in-memory snapshot
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    name: String,
    records: Arc<Vec<PhysiologicalRecord>>,
}

impl InMemoryStore {
    /// Create a store from records in any order
    pub fn new(name: impl Into<String>, mut records: Vec<PhysiologicalRecord>) -> Self {
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Self {
            name: name.into(),
            records: Arc::new(records),
        }
    }

    /// Built-in development dataset ending on `anchor`
    ///
    /// Fifteen readings, two per day at 08:00 and 20:00 UTC, the newest at
    /// 20:00 on `anchor`.
    pub fn sample(anchor: NaiveDate) -> Self {
        let newest = Utc.from_utc_datetime(&anchor.and_hms_opt(20, 0, 0).unwrap_or_default());

        let records = (0..SAMPLE_HRV.len())
            .map(|i| {
                let steps_back = (SAMPLE_HRV.len() - 1 - i) as i64;
                let timestamp = newest - Duration::hours(12 * steps_back);
                PhysiologicalRecord::new(
                    i as u32 + 1,
                    timestamp,
                    SAMPLE_HRV[i],
                    SAMPLE_STRESS[i],
                    SAMPLE_AGE[i],
                )
                .sdnn(SAMPLE_SDNN[i])
                .pnn50(SAMPLE_PNN50[i])
                .heart_rate(SAMPLE_HEART_RATE[i])
                .respiratory_rate(SAMPLE_RESPIRATORY_RATE[i])
            })
            .collect();

        Self::new("sample", records)
    }

    /// Number of records in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Calendar day of the newest record
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date())
    }

    /// Records whose date falls within `window`
    pub fn records_in(&self, window: &DayWindow) -> Vec<PhysiologicalRecord> {
        self.records
            .iter()
            .filter(|r| window.contains(r.date()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TimeSeriesStore for InMemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_records(&self, days: u32) -> StoreResult<Vec<PhysiologicalRecord>> {
        let Some(latest) = self.latest_date() else {
            return Ok(Vec::new());
        };
        let window = DayWindow::ending(latest, days).ok_or(StoreError::InvalidWindow(days))?;

        let records = self.records_in(&window);
        tracing::debug!(
            store = %self.name,
            days,
            start = %window.start,
            end = %window.end,
            records = records.len(),
            "Selected records for window"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 7).unwrap()
    }

    #[test]
    fn test_sample_layout() {
        let store = InMemoryStore::sample(anchor());
        assert_eq!(store.len(), 15);
        assert_eq!(store.latest_date(), Some(anchor()));

        // Chronological and unique ids
        let records = store.records.clone();
        assert!(records.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(records.last().unwrap().id, 15);
        assert_eq!(records.first().unwrap().hrv, 45.2);
        assert!(records.iter().all(|r| r.heart_rate.is_some()));
    }

    #[tokio::test]
    async fn test_get_records_window() {
        let store = InMemoryStore::sample(anchor());

        // Last day holds the 08:00 and 20:00 readings
        let one_day = store.get_records(1).await.unwrap();
        assert_eq!(one_day.len(), 2);
        assert!(one_day.iter().all(|r| r.date() == anchor()));

        let week = store.get_records(7).await.unwrap();
        assert_eq!(week.len(), 14);

        let all = store.get_records(30).await.unwrap();
        assert_eq!(all.len(), 15);
    }

    #[tokio::test]
    async fn test_zero_day_window_rejected() {
        let store = InMemoryStore::sample(anchor());
        let err = store.get_records(0).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidWindow(0)));
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = InMemoryStore::new("empty", Vec::new());
        assert!(store.is_empty());
        assert!(store.get_records(7).await.unwrap().is_empty());
    }

    #[test]
    fn test_new_sorts_records() {
        let late = Utc.with_ymd_and_hms(2024, 7, 2, 8, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let store = InMemoryStore::new(
            "unsorted",
            vec![
                PhysiologicalRecord::new(2, late, 50.0, 20.0, 30),
                PhysiologicalRecord::new(1, early, 40.0, 30.0, 30),
            ],
        );
        assert_eq!(store.records[0].id, 1);
        assert_eq!(store.name(), "unsorted");
    }
}
