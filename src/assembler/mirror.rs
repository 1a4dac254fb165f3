//! Mirror view computations
//!
//! Formulas (all inputs clamped before weighting):
//!
//! ```text
//! hrv_norm = clamp((hrv - 20) / 60, 0, 1)
//! calm     = 1 - clamp(stress / 100, 0, 1)
//! focus    = 100 * (0.6 * hrv_norm + 0.4 * calm)
//! score    = round(100 * (0.40 * hrv_norm + 0.35 * calm + 0.25 * focus / 100))
//! ```
//!
//! A missing input counts as the neutral value 0.5.

use super::payload::{LayerMetric, MirrorLayer, MirrorLayers, TrendPoint};
use crate::stats::buckets::stress_level;
use crate::stats::round_to;
use crate::stats::summary::mean;
use crate::store::{NumericField, PhysiologicalRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Rendered in place of a value that has no data
pub const PLACEHOLDER: &str = "N/A";

const HRV_FLOOR: f64 = 20.0;
const HRV_SPAN: f64 = 60.0;
const NEUTRAL: f64 = 0.5;

/// HRV normalized into 0-1
pub fn hrv_norm(hrv: f64) -> f64 {
    ((hrv - HRV_FLOOR) / HRV_SPAN).clamp(0.0, 1.0)
}

/// Inverse stress normalized into 0-1
pub fn calm(stress: f64) -> f64 {
    1.0 - (stress / 100.0).clamp(0.0, 1.0)
}

/// Focus composite on a 0-100 scale, 1 decimal
pub fn focus_composite(hrv: f64, stress: f64) -> f64 {
    round_to(focus_from_components(hrv_norm(hrv), calm(stress)) * 100.0, 1)
}

fn focus_from_components(hrv_c: f64, calm_c: f64) -> f64 {
    0.6 * hrv_c + 0.4 * calm_c
}

fn component(value: Option<f64>, normalize: fn(f64) -> f64) -> f64 {
    value
        .filter(|v| v.is_finite())
        .map(normalize)
        .unwrap_or(NEUTRAL)
}

/// Coordination score from window means, always within 0-100
pub fn coordination_score(mean_hrv: Option<f64>, mean_stress: Option<f64>) -> u8 {
    let hrv_c = component(mean_hrv, hrv_norm);
    let calm_c = component(mean_stress, calm);
    let focus_c = focus_from_components(hrv_c, calm_c);

    let raw = 100.0 * (0.40 * hrv_c + 0.35 * calm_c + 0.25 * focus_c);
    raw.round().clamp(0.0, 100.0) as u8
}

/// Alignment band for a coordination score
pub fn alignment_band(score: u8) -> &'static str {
    if score >= 70 {
        "aligned"
    } else if score >= 40 {
        "mixed"
    } else {
        "strained"
    }
}

/// One point per calendar day present in the records, oldest first
///
/// Days without records are not padded.
pub fn trend_series(records: &[PhysiologicalRecord]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let entry = by_day.entry(record.date()).or_default();
        entry.0.push(record.hrv);
        entry.1.push(record.stress_score);
    }

    by_day
        .into_iter()
        .filter_map(|(date, (hrv, stress))| {
            let hrv = mean(&hrv)?;
            let stress = mean(&stress)?;
            Some(TrendPoint {
                date,
                hrv: round_to(hrv, 1),
                stress: round_to(stress, 1),
                focus: focus_composite(hrv, stress),
            })
        })
        .collect()
}

/// Direction of recent energy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Rising,
    Steady,
    Dipping,
    Unknown,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "Rising",
            TrendDirection::Steady => "Steady",
            TrendDirection::Dipping => "Dipping",
            TrendDirection::Unknown => PLACEHOLDER,
        }
    }
}

/// Energy pattern read from the trend
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyPattern {
    pub direction: TrendDirection,
    pub text: String,
}

/// Focus delta beyond which the pattern counts as rising or dipping
const FOCUS_DELTA: f64 = 2.0;

/// Compare the last `k` trend points with the `k` before them
///
/// `k = min(3, n / 2)`. Fewer than two points yields a generic statement.
pub fn energy_pattern(trend: &[TrendPoint]) -> EnergyPattern {
    let n = trend.len();
    if n < 2 {
        return EnergyPattern {
            direction: TrendDirection::Unknown,
            text: "Not enough daily data yet to read an energy pattern; keep logging to reveal your rhythm."
                .to_string(),
        };
    }

    let k = (n / 2).min(3);
    let recent = &trend[n - k..];
    let prior = &trend[n - 2 * k..n - k];

    let avg = |points: &[TrendPoint], f: fn(&TrendPoint) -> f64| {
        points.iter().map(f).sum::<f64>() / points.len() as f64
    };
    let focus_delta = avg(recent, |p| p.focus) - avg(prior, |p| p.focus);
    let hrv_delta = avg(recent, |p| p.hrv) - avg(prior, |p| p.hrv);
    let stress_delta = avg(recent, |p| p.stress) - avg(prior, |p| p.stress);

    let span = if k == 1 {
        "the last day".to_string()
    } else {
        format!("the last {} days", k)
    };

    let (direction, text) = if focus_delta > FOCUS_DELTA {
        (
            TrendDirection::Rising,
            format!(
                "Energy is rising: focus up {:.1} points over {} as HRV moved {:+.1} ms and stress {:+.1}.",
                focus_delta, span, hrv_delta, stress_delta
            ),
        )
    } else if focus_delta < -FOCUS_DELTA {
        (
            TrendDirection::Dipping,
            format!(
                "Energy is dipping: focus down {:.1} points over {}, with HRV {:+.1} ms and stress {:+.1}.",
                focus_delta.abs(),
                span,
                hrv_delta,
                stress_delta
            ),
        )
    } else {
        (
            TrendDirection::Steady,
            format!(
                "Energy is steady: focus held within {:.1} points over {}.",
                focus_delta.abs(),
                span
            ),
        )
    };

    EnergyPattern { direction, text }
}

/// Most recent value of a field
pub fn latest_value(records: &[PhysiologicalRecord], field: NumericField) -> Option<f64> {
    records.iter().rev().find_map(|r| r.value(field))
}

fn render(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{:.*}", decimals, v),
        Some(v) => format!("{:.*} {}", decimals, v, unit),
        None => PLACEHOLDER.to_string(),
    }
}

/// Build the three fixed layers from the latest available values
pub fn mirror_layers(
    records: &[PhysiologicalRecord],
    trend: &[TrendPoint],
    score: u8,
    pattern: &EnergyPattern,
) -> MirrorLayers {
    let latest = |field: NumericField| latest_value(records, field);
    let stress = latest(NumericField::StressScore);

    let physiology = MirrorLayer {
        title: "Physiology".to_string(),
        description: "What your body is signalling in the most recent readings.".to_string(),
        metrics: [
            NumericField::Hrv,
            NumericField::HeartRate,
            NumericField::RespiratoryRate,
        ]
        .iter()
        .map(|&f| LayerMetric::new(f.label(), render(latest(f), 1, f.unit())))
        .collect(),
    };

    let mind = MirrorLayer {
        title: "Mind".to_string(),
        description: "How load and attention are showing up right now.".to_string(),
        metrics: vec![
            LayerMetric::new(NumericField::StressScore.label(), render(stress, 0, "")),
            LayerMetric::new(
                "Stress Level",
                stress.map(stress_level).unwrap_or(PLACEHOLDER),
            ),
            LayerMetric::new("Focus", render(trend.last().map(|p| p.focus), 1, "")),
        ],
    };

    let meaning = MirrorLayer {
        title: "Meaning".to_string(),
        description: "How well body and mind are moving together.".to_string(),
        metrics: vec![
            LayerMetric::new("Coordination", format!("{}/100", score)),
            LayerMetric::new("Alignment", capitalize(alignment_band(score))),
            LayerMetric::new("Energy Pattern", pattern.direction.label()),
        ],
    };

    MirrorLayers {
        physiology,
        mind,
        meaning,
    }
}

/// One-sentence summary of the mirror state
pub fn insight_summary(score: u8, mean_hrv: Option<f64>, mean_stress: Option<f64>) -> String {
    format!(
        "Your coordination score is {}/100 ({}), with average HRV at {} and stress at {}.",
        score,
        alignment_band(score),
        render(mean_hrv, 1, NumericField::Hrv.unit()),
        render(mean_stress, 1, "")
    )
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
    use chrono::{TimeZone, Utc};

    fn record(id: u32, day: u32, hour: u32, hrv: f64, stress: f64) -> PhysiologicalRecord {
        let ts = Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap();
        PhysiologicalRecord::new(id, ts, hrv, stress, 30)
    }

    fn point(day: u32, focus: f64) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            hrv: 50.0,
            stress: 25.0,
            focus,
        }
    }

    #[test]
    fn test_focus_composite() {
        // hrv_norm = 0.5, calm = 0.75 -> 0.6*0.5 + 0.4*0.75 = 0.6
        assert_eq!(focus_composite(50.0, 25.0), 60.0);
        assert_eq!(focus_composite(200.0, -10.0), 100.0);
        assert_eq!(focus_composite(0.0, 150.0), 0.0);
        // Monotonic in both inputs
        assert!(focus_composite(60.0, 25.0) > focus_composite(50.0, 25.0));
        assert!(focus_composite(50.0, 40.0) < focus_composite(50.0, 25.0));
    }

    #[test]
    fn test_coordination_score_bounds() {
        assert_eq!(coordination_score(None, None), 50);
        assert_eq!(coordination_score(Some(1000.0), Some(0.0)), 100);
        assert_eq!(coordination_score(Some(-50.0), Some(500.0)), 0);
        assert_eq!(coordination_score(Some(f64::NAN), Some(f64::INFINITY)), 50);

        for hrv in [0.0, 20.0, 35.5, 50.0, 80.0, 120.0] {
            for stress in [0.0, 19.9, 20.0, 35.0, 60.0, 100.0] {
                let score = coordination_score(Some(hrv), Some(stress));
                assert!(score <= 100);
            }
        }
    }

    #[test]
    fn test_trend_series_groups_by_day() {
        let records = vec![
            record(1, 1, 8, 40.0, 30.0),
            record(2, 1, 20, 50.0, 20.0),
            record(3, 3, 8, 60.0, 10.0),
        ];
        let trend = trend_series(&records);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(trend[0].hrv, 45.0);
        assert_eq!(trend[0].stress, 25.0);
        assert_eq!(trend[1].focus, focus_composite(60.0, 10.0));

        assert!(trend_series(&[]).is_empty());
    }

    #[test]
    fn test_energy_pattern_fallback() {
        let pattern = energy_pattern(&[point(1, 60.0)]);
        assert_eq!(pattern.direction, TrendDirection::Unknown);
        assert!(!pattern.text.is_empty());
        assert_eq!(energy_pattern(&[]).direction, TrendDirection::Unknown);
    }

    #[test]
    fn test_energy_pattern_directions() {
        let rising: Vec<_> = (1..=6).map(|d| point(d, 50.0 + d as f64 * 2.0)).collect();
        let pattern = energy_pattern(&rising);
        assert_eq!(pattern.direction, TrendDirection::Rising);
        assert!(pattern.text.contains("the last 3 days"));

        let dipping = vec![point(1, 70.0), point(2, 60.0)];
        let pattern = energy_pattern(&dipping);
        assert_eq!(pattern.direction, TrendDirection::Dipping);
        assert!(pattern.text.contains("the last day"));

        let steady = vec![point(1, 60.0), point(2, 61.0), point(3, 60.5)];
        assert_eq!(energy_pattern(&steady).direction, TrendDirection::Steady);
    }

    #[test]
    fn test_layers_use_placeholders() {
        let records = vec![record(1, 1, 8, 48.0, 22.0)];
        let trend = trend_series(&records);
        let pattern = energy_pattern(&trend);
        let layers = mirror_layers(&records, &trend, 64, &pattern);

        assert_eq!(layers.physiology.metrics[0].value, "48.0 ms");
        assert_eq!(layers.physiology.metrics[1].value, PLACEHOLDER);
        assert_eq!(layers.mind.metrics[1].value, "Medium");
        assert_eq!(layers.meaning.metrics[0].value, "64/100");
        assert_eq!(layers.meaning.metrics[1].value, "Mixed");
        assert_eq!(layers.meaning.metrics[2].value, PLACEHOLDER);

        let empty = mirror_layers(&[], &[], 50, &energy_pattern(&[]));
        assert_eq!(empty.physiology.metrics.len(), 3);
        assert!(empty.mind.metrics.iter().all(|m| m.value == PLACEHOLDER));
    }

    #[test]
    fn test_insight_summary() {
        let summary = insight_summary(72, Some(50.28), None);
        assert_eq!(
            summary,
            "Your coordination score is 72/100 (aligned), with average HRV at 50.3 ms and stress at N/A."
        );
    }
}
