//! Insight Assembler
//!
//! Shapes a `StatsBundle` into the payload for the requested mode:
//!
//! - **longevity**: the combined analysis as computed
//! - **energy**: the combined analysis plus coordination score, three mirror
//!   layers, a daily trend series and an energy pattern
//!
//! Assembly is a pure function of its inputs.

pub mod mirror;
pub mod payload;

pub use mirror::{EnergyPattern, TrendDirection, PLACEHOLDER};
pub use payload::{
    CombinedAnalysis, InsightPayload, LayerMetric, MirrorInsight, MirrorLayer, MirrorLayers, Mode,
    TrendPoint,
};

use crate::stats::StatsBundle;
use crate::store::NumericField;

/// Stateless assembly stage
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightAssembler;

impl InsightAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build the payload for `mode`
    pub fn assemble(&self, mode: Mode, stats: StatsBundle, query: &str) -> InsightPayload {
        let analysis = CombinedAnalysis {
            query: query.to_string(),
            stats,
        };

        match mode {
            Mode::Longevity => InsightPayload::Longevity(analysis),
            Mode::Energy => InsightPayload::Energy(self.mirror(analysis)),
        }
    }

    fn mirror(&self, analysis: CombinedAnalysis) -> MirrorInsight {
        let stats = &analysis.stats;
        let mean_hrv = stats.mean(NumericField::Hrv);
        let mean_stress = stats.mean(NumericField::StressScore);

        let trend = mirror::trend_series(&stats.records);
        let score = mirror::coordination_score(mean_hrv, mean_stress);
        let pattern = mirror::energy_pattern(&trend);
        let layers = mirror::mirror_layers(&stats.records, &trend, score, &pattern);
        let summary = mirror::insight_summary(score, mean_hrv, mean_stress);

        tracing::debug!(
            coordination_score = score,
            trend_points = trend.len(),
            pattern = ?pattern.direction,
            "Assembled mirror view"
        );

        MirrorInsight {
            coordination_score: score,
            insight_summary: summary,
            mirror_layers: layers,
            mirror_trend: trend,
            energy_pattern: pattern.text,
            analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatisticsEngine;
    use crate::store::{InMemoryStore, PhysiologicalRecord, TimeSeriesStore};
    use chrono::{NaiveDate, TimeZone, Utc};

    async fn sample_bundle(days: u32) -> StatsBundle {
        let store = InMemoryStore::sample(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
        let records = store.get_records(days).await.unwrap();
        StatisticsEngine::new().analyze(records)
    }

    #[tokio::test]
    async fn test_longevity_is_flat() {
        let payload = InsightAssembler::new().assemble(Mode::Longevity, sample_bundle(7).await, "hrv?");

        assert_eq!(payload.mode(), Mode::Longevity);
        assert!(payload.mirror().is_none());
        assert!(payload.trend().is_empty());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["mode"], "longevity");
        assert_eq!(json["query"], "hrv?");
        assert!(json["statistics"].is_object());
        assert!(json.get("coordination_score").is_none());
    }

    #[tokio::test]
    async fn test_energy_has_mirror_fields() {
        let payload = InsightAssembler::new().assemble(Mode::Energy, sample_bundle(7).await, "energy");
        let mirror = payload.mirror().unwrap();

        assert!(mirror.coordination_score <= 100);
        assert_eq!(mirror.mirror_trend.len(), 7);
        assert!(!mirror.energy_pattern.is_empty());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["mode"], "energy");
        assert!(json["mirror_layers"]["physiology"]["metrics"].is_array());
        assert!(json["mirror_layers"]["mind"].is_object());
        assert!(json["mirror_layers"]["meaning"].is_object());
        assert!(json["insights"].is_array());
        assert!(json["correlations"].is_object());
    }

    #[test]
    fn test_three_days_of_data_in_seven_day_window() {
        let records: Vec<PhysiologicalRecord> = [(1, 45.0, 30.0), (2, 50.0, 25.0), (4, 55.0, 20.0)]
            .iter()
            .enumerate()
            .map(|(i, &(day, hrv, stress))| {
                let ts = Utc.with_ymd_and_hms(2024, 7, day, 9, 0, 0).unwrap();
                PhysiologicalRecord::new(i as u32 + 1, ts, hrv, stress, 31)
            })
            .collect();
        let bundle = StatisticsEngine::new().analyze(records);
        let payload = InsightAssembler::new().assemble(Mode::Energy, bundle, "week");
        let mirror = payload.mirror().unwrap();

        assert_eq!(mirror.mirror_trend.len(), 3);
        assert!(!mirror.energy_pattern.is_empty());
    }

    #[test]
    fn test_energy_with_no_records() {
        let bundle = StatisticsEngine::new().analyze(Vec::new());
        let payload = InsightAssembler::new().assemble(Mode::Energy, bundle, "anything");
        let mirror = payload.mirror().unwrap();

        assert_eq!(mirror.coordination_score, 50);
        assert!(mirror.mirror_trend.is_empty());
        assert_eq!(mirror.mirror_layers.physiology.metrics[0].value, PLACEHOLDER);
        assert!(mirror.energy_pattern.starts_with("Not enough daily data"));
    }
}
