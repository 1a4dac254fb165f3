//! Insight response shapes

use crate::assembler::{mirror, InsightPayload, MirrorInsight};
use crate::chart::ChartSpec;
use crate::narrative::{
    BackendKind, Length, NarrativeResult, Tone, MAX_INSIGHTS_USED, MAX_TAKEAWAYS,
};
use crate::stats::StatsBundle;
use crate::store::NumericField;
use serde::Serialize;

/// Narrative text used when synthesis fails outright
pub const DEGRADED_NARRATIVE: &str =
    "A narrative could not be generated for this request. The statistics and chart below are still available.";

/// Merged pipeline output
#[derive(Debug, Clone, Serialize)]
pub struct InsightResponse {
    pub insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    pub data: InsightPayload,
    pub chart: ChartSpec,
    pub narrative: NarrativeMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

/// Narrative details other than the main text
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NarrativeMeta {
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub insights_used: Vec<String>,
    pub tone: Tone,
    pub length: Length,
    pub model_name: String,
    pub fallback_used: bool,
}

impl NarrativeMeta {
    pub fn from_result(result: NarrativeResult) -> (String, Self) {
        let meta = Self {
            summary: result.summary,
            key_takeaways: result.key_takeaways,
            insights_used: result.insights_used,
            tone: result.tone,
            length: result.length,
            model_name: result.model_name,
            fallback_used: result.fallback_used,
        };
        (result.narrative, meta)
    }

    /// Metadata for a request whose synthesis failed
    pub fn degraded(stats: &StatsBundle, model_name: &str, tone: Tone, length: Length) -> Self {
        Self {
            summary: DEGRADED_NARRATIVE.to_string(),
            key_takeaways: stats.insights.iter().take(MAX_TAKEAWAYS).cloned().collect(),
            insights_used: stats.insights.iter().take(MAX_INSIGHTS_USED).cloned().collect(),
            tone,
            length,
            model_name: model_name.to_string(),
            fallback_used: true,
        }
    }
}

/// Headline block for energy mode
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Hero {
    pub coordination_score: u8,
    pub headline: String,
    pub energy_pattern: String,
}

impl Hero {
    pub fn from_mirror(mirror_insight: &MirrorInsight) -> Self {
        let score = mirror_insight.coordination_score;
        let headline = match mirror::alignment_band(score) {
            "aligned" => "Body and mind are moving together",
            "mixed" => "Some signals are pulling in different directions",
            _ => "Your system is under strain",
        };
        Self {
            coordination_score: score,
            headline: headline.to_string(),
            energy_pattern: mirror_insight.energy_pattern.clone(),
        }
    }
}

/// Background reading attached to longevity responses
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reference {
    pub title: &'static str,
    pub url: &'static str,
}

/// Fixed reading list for longevity responses
pub fn longevity_references() -> Vec<Reference> {
    vec![
        Reference {
            title: "An Overview of Heart Rate Variability Metrics and Norms",
            url: "https://doi.org/10.3389/fpubh.2017.00258",
        },
        Reference {
            title: "Heart rate variability, stress and health: a meta-analysis",
            url: "https://doi.org/10.30773/pi.2017.08.17",
        },
        Reference {
            title: "Age and gender related reference values of heart rate variability",
            url: "https://doi.org/10.1111/j.1540-8159.2010.02841.x",
        },
    ]
}

const MAX_RECOMMENDATIONS: usize = 4;

/// Rule-based recommendations from the statistics
pub fn recommendations(stats: &StatsBundle) -> Vec<String> {
    let mut recs = Vec::new();

    if let Some(stress) = stats.mean(NumericField::StressScore) {
        if stress > 35.0 {
            recs.push(format!(
                "Average stress is {:.1}; schedule short breathing or recovery breaks during the day.",
                stress
            ));
        }
    }

    if let Some(hrv) = stats.mean(NumericField::Hrv) {
        if hrv < 40.0 {
            recs.push(format!(
                "Average HRV is {:.1} ms; prioritize sleep and lighter training until it recovers.",
                hrv
            ));
        }
    }

    if let Some(r) = stats.correlations.hrv_vs_stress {
        if r < -0.5 {
            recs.push(
                "HRV drops as stress rises; managing stress is the most direct lever on recovery."
                    .to_string(),
            );
        }
    }

    if stats.hrv_by_stress_level.get("High").is_some() {
        recs.push("Track what precedes high-stress readings to find avoidable triggers.".to_string());
    }

    recs.push("Keep a consistent sleep and wake time to stabilize HRV over the long term.".to_string());
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

/// Execution record for one request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineTrace {
    /// Stage descriptions in execution order
    pub stages: Vec<String>,
    pub backend: BackendKind,
    pub fallback_used: bool,
    pub degraded: bool,
}

impl PipelineTrace {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            stages: Vec::new(),
            backend,
            fallback_used: false,
            degraded: false,
        }
    }

    pub fn record(&mut self, stage: impl Into<String>) {
        self.stages.push(stage.into());
    }
}

/// Response plus its trace
#[derive(Debug, Clone)]
pub struct InsightOutcome {
    pub response: InsightResponse,
    pub trace: PipelineTrace,
}
