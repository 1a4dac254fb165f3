//! Mode-specific insight payloads
//!
//! `InsightPayload` is a tagged union keyed by `mode`. Both variants share
//! the statistics core (`CombinedAnalysis`); the energy variant adds the
//! layered mirror view on top.

use crate::stats::StatsBundle;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operating mode selected by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Layered mirror view with coordination score and daily trend
    Energy,
    /// Flat combined analysis
    Longevity,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Energy => "energy",
            Mode::Longevity => "longevity",
        }
    }

    pub fn all() -> &'static [Mode] {
        &[Mode::Energy, Mode::Longevity]
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "energy" => Ok(Mode::Energy),
            "longevity" => Ok(Mode::Longevity),
            other => Err(format!(
                "unknown mode '{}', expected one of: energy, longevity",
                other
            )),
        }
    }
}

/// Flat analysis shared by both modes
#[derive(Debug, Clone, Serialize)]
pub struct CombinedAnalysis {
    pub query: String,
    #[serde(flatten)]
    pub stats: StatsBundle,
}

/// One labelled value inside a mirror layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayerMetric {
    pub label: String,
    pub value: String,
}

impl LayerMetric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single layer of the mirror view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MirrorLayer {
    pub title: String,
    pub description: String,
    pub metrics: Vec<LayerMetric>,
}

/// The three fixed layers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MirrorLayers {
    pub physiology: MirrorLayer,
    pub mind: MirrorLayer,
    pub meaning: MirrorLayer,
}

/// One day of the mirror trend
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub hrv: f64,
    pub stress: f64,
    /// Derived composite of HRV and inverse stress, 0-100
    pub focus: f64,
}

/// Layered view produced in energy mode
#[derive(Debug, Clone, Serialize)]
pub struct MirrorInsight {
    pub coordination_score: u8,
    pub insight_summary: String,
    pub mirror_layers: MirrorLayers,
    pub mirror_trend: Vec<TrendPoint>,
    pub energy_pattern: String,
    #[serde(flatten)]
    pub analysis: CombinedAnalysis,
}

/// Assembled payload, tagged by mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum InsightPayload {
    Energy(MirrorInsight),
    Longevity(CombinedAnalysis),
}

impl InsightPayload {
    pub fn mode(&self) -> Mode {
        match self {
            InsightPayload::Energy(_) => Mode::Energy,
            InsightPayload::Longevity(_) => Mode::Longevity,
        }
    }

    /// Shared statistics core
    pub fn analysis(&self) -> &CombinedAnalysis {
        match self {
            InsightPayload::Energy(mirror) => &mirror.analysis,
            InsightPayload::Longevity(analysis) => analysis,
        }
    }

    pub fn stats(&self) -> &StatsBundle {
        &self.analysis().stats
    }

    pub fn query(&self) -> &str {
        &self.analysis().query
    }

    /// Mirror view, present only in energy mode
    pub fn mirror(&self) -> Option<&MirrorInsight> {
        match self {
            InsightPayload::Energy(mirror) => Some(mirror),
            InsightPayload::Longevity(_) => None,
        }
    }

    /// Daily trend, empty outside energy mode
    pub fn trend(&self) -> &[TrendPoint] {
        self.mirror().map(|m| m.mirror_trend.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("energy".parse::<Mode>().unwrap(), Mode::Energy);
        assert_eq!("longevity".parse::<Mode>().unwrap(), Mode::Longevity);
        assert!("ENERGY".parse::<Mode>().is_err());
        assert!(" longevity ".parse::<Mode>().is_err());

        let err = "unknown".parse::<Mode>().unwrap_err();
        assert!(err.contains("unknown mode 'unknown'"));
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(serde_json::to_string(&Mode::Energy).unwrap(), "\"energy\"");
        let mode: Mode = serde_json::from_str("\"longevity\"").unwrap();
        assert_eq!(mode, Mode::Longevity);
        assert_eq!(Mode::all().len(), 2);
    }

    #[test]
    fn test_trend_point_date_format() {
        let point = TrendPoint {
            date: NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
            hrv: 50.0,
            stress: 25.0,
            focus: 70.0,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"date\":\"2024-07-03\""));
    }
}
