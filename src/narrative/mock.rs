//! Template-backed narrative generator
//!
//! Deterministic: identical payloads render byte-identical narratives.

use super::error::TemplateError;
use super::templates::{render, render_text, BoundValues, TemplateId};
use super::{Length, NarrativeResult, Tone, MAX_INSIGHTS_USED, MAX_TAKEAWAYS};
use crate::assembler::InsightPayload;
use crate::stats::buckets::{BucketedSummary, Classifier};
use crate::stats::correlation::{correlation_direction, correlation_strength};
use crate::stats::round_to;
use crate::store::NumericField;

/// Model name reported for template output
pub const TEMPLATE_MODEL_NAME: &str = "aurora-template-v1";

const SECTION_SEPARATOR: &str = "\n\n";

/// Insights quoted in the summary line
const SUMMARY_INSIGHTS: usize = 3;

/// Renders narratives from fixed templates
///
/// An operator-supplied closing line replaces the tone's built-in closing.
/// It may use any placeholder the payload binds; one the payload cannot
/// bind fails the render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockGenerator {
    tone: Tone,
    length: Length,
    closing: Option<String>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new(Tone::default(), Length::default())
    }
}

impl MockGenerator {
    pub fn new(tone: Tone, length: Length) -> Self {
        Self {
            tone,
            length,
            closing: None,
        }
    }

    /// Builder: custom closing template
    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = Some(closing.into());
        self
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn length(&self) -> Length {
        self.length
    }

    /// Render the narrative for a payload
    pub fn generate(
        &self,
        query: &str,
        payload: &InsightPayload,
    ) -> Result<NarrativeResult, TemplateError> {
        let values = bind_values(query, payload);
        let insights = &payload.stats().insights;

        let mut sections = vec![render(TemplateId::Opening(self.tone), &values)?];

        if payload.stats().record_count() == 0 {
            sections.push(render(TemplateId::NoData, &values)?);
        } else {
            if values.has_all(&["avg_hrv", "avg_stress"]) {
                sections.push(render(TemplateId::AverageHrv, &values)?);
            }
            if self.length != Length::Short {
                if values.contains("hrv_gap") {
                    sections.push(render(TemplateId::StressContrast, &values)?);
                }
                if values.contains("hrv_stress_r") {
                    sections.push(render(TemplateId::Correlation, &values)?);
                }
            }
        }

        if payload.mirror().is_some() {
            sections.push(render(TemplateId::Mirror, &values)?);
        }

        if self.length == Length::Long && !insights.is_empty() {
            sections.push(render(TemplateId::Supporting, &values)?);
        }

        let closing = match &self.closing {
            Some(text) => render_text(text, &values)?,
            None => render(TemplateId::Closing(self.tone), &values)?,
        };
        sections.push(closing);

        let summary = if insights.is_empty() {
            render(TemplateId::EmptySummary, &values)?
        } else {
            render(TemplateId::Summary, &values)?
        };

        Ok(NarrativeResult {
            narrative: sections.join(SECTION_SEPARATOR),
            summary,
            key_takeaways: insights.iter().take(MAX_TAKEAWAYS).cloned().collect(),
            insights_used: insights.iter().take(MAX_INSIGHTS_USED).cloned().collect(),
            tone: self.tone,
            length: self.length,
            model_name: TEMPLATE_MODEL_NAME.to_string(),
            fallback_used: false,
        })
    }
}

/// Collect every placeholder value the payload supports
///
/// Values the payload cannot provide stay unbound; the generator skips the
/// sections that need them.
pub fn bind_values(query: &str, payload: &InsightPayload) -> BoundValues {
    let stats = payload.stats();
    let insights = &stats.insights;

    let mut values = BoundValues::new()
        .bind("query", query)
        .bind("record_count", stats.record_count())
        .bind("window_fields", stats.data_summary.fields.len())
        .bind_opt("avg_hrv", stats.mean(NumericField::Hrv).map(|v| format!("{:.2}", v)))
        .bind_opt(
            "avg_stress",
            stats.mean(NumericField::StressScore).map(|v| format!("{:.2}", v)),
        )
        .bind("insight_count", insights.len())
        .bind("top_insights", summary_insights(insights))
        .bind(
            "insight_list",
            insights.iter().take(MAX_INSIGHTS_USED).cloned().collect::<Vec<_>>().join("; "),
        );

    if let Some((low, high)) = extreme_buckets(&stats.hrv_by_stress_level) {
        values = values
            .bind("low_label", low.0)
            .bind("low_hrv", format!("{:.2}", low.1))
            .bind("high_label", high.0)
            .bind("high_hrv", format!("{:.2}", high.1))
            .bind("hrv_gap", format!("{:.2}", round_to(low.1 - high.1, 2)));
    }

    if let Some(r) = stats.correlations.hrv_vs_stress {
        values = values
            .bind("hrv_stress_r", format!("{:.3}", r))
            .bind("corr_strength", correlation_strength(r))
            .bind("corr_direction", correlation_direction(r));
    }

    if let Some(mirror) = payload.mirror() {
        values = values
            .bind("coordination_score", mirror.coordination_score)
            .bind("energy_pattern", &mirror.energy_pattern);
    }

    values
}

/// Leading insights for the summary line, noting how many were left out
fn summary_insights(insights: &[String]) -> String {
    let mut text = insights
        .iter()
        .take(SUMMARY_INSIGHTS)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if insights.len() > SUMMARY_INSIGHTS {
        text.push_str(&format!(
            ", and {} additional findings.",
            insights.len() - SUMMARY_INSIGHTS
        ));
    }
    text
}

/// First and last populated stress buckets, as `(label, average)`
fn extreme_buckets(summary: &BucketedSummary) -> Option<((&'static str, f64), (&'static str, f64))> {
    if summary.classifier != Classifier::StressLevel {
        return None;
    }
    let populated: Vec<(&'static str, f64)> = summary
        .buckets
        .iter()
        .filter_map(|b| b.stats.average.map(|avg| (b.label, avg)))
        .collect();

    match (populated.first(), populated.last()) {
        (Some(&first), Some(&last)) if populated.len() >= 2 => Some((first, last)),
        _ => None,
    }
}
