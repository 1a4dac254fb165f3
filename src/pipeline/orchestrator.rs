//! Insight Orchestrator
//!
//! Runs one request end to end: validate, fetch, analyze, assemble, then
//! synthesize the narrative and build the chart concurrently.

use super::error::PipelineResult;
use super::request::InsightRequest;
use super::response::{
    longevity_references, recommendations, Hero, InsightOutcome, InsightResponse, NarrativeMeta,
    PipelineTrace, DEGRADED_NARRATIVE,
};
use crate::assembler::{InsightAssembler, InsightPayload, Mode};
use crate::chart::{ChartSpec, ChartSpecBuilder};
use crate::config::PipelineConfig;
use crate::narrative::NarrativeSynthesizer;
use crate::stats::StatisticsEngine;
use crate::store::TimeSeriesStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Coordinates every pipeline stage for a request
#[derive(Clone)]
pub struct InsightOrchestrator {
    store: Arc<dyn TimeSeriesStore>,
    engine: StatisticsEngine,
    assembler: InsightAssembler,
    synthesizer: Arc<NarrativeSynthesizer>,
    charts: ChartSpecBuilder,
    config: PipelineConfig,
}

impl InsightOrchestrator {
    pub fn new(
        store: Arc<dyn TimeSeriesStore>,
        synthesizer: Arc<NarrativeSynthesizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            engine: StatisticsEngine::new(),
            assembler: InsightAssembler::new(),
            synthesizer,
            charts: ChartSpecBuilder::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn TimeSeriesStore> {
        &self.store
    }

    pub fn synthesizer(&self) -> &NarrativeSynthesizer {
        &self.synthesizer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle one request
    pub async fn handle(&self, request: &InsightRequest) -> PipelineResult<InsightOutcome> {
        let started = Instant::now();
        let valid = request.validate(&self.config)?;
        let mut trace = PipelineTrace::new(self.synthesizer.backend());

        if valid.days_clamped {
            debug!(requested = ?request.days, days = valid.days, "Clamped window");
        }
        trace.record(format!(
            "validate: mode={} days={}{}",
            valid.mode,
            valid.days,
            if valid.days_clamped { " (clamped)" } else { "" }
        ));

        let records = self.store.get_records(valid.days).await?;
        trace.record(format!(
            "{}: fetched {} records",
            self.store.name(),
            records.len()
        ));

        let stats = self.engine.analyze(records);
        trace.record(format!(
            "statistics: {} insights from {} records",
            stats.insights.len(),
            stats.record_count()
        ));

        let payload = self.assembler.assemble(valid.mode, stats, &valid.query);
        trace.record(format!("assembler: {} payload", payload.mode()));

        let (narrative, chart) = tokio::join!(
            self.synthesizer.synthesize(&valid.query, &payload),
            async { self.charts.build(&payload) }
        );

        let (insight, meta) = match narrative {
            Ok(result) => {
                trace.fallback_used = result.fallback_used;
                trace.record(format!(
                    "narrative: {} via {}{}",
                    result.length.as_str(),
                    result.model_name,
                    if result.fallback_used { " (fallback)" } else { "" }
                ));
                NarrativeMeta::from_result(result)
            }
            Err(err) => {
                warn!(error = %err, "Narrative synthesis failed, returning degraded response");
                trace.degraded = true;
                trace.fallback_used = true;
                trace.record("narrative: degraded");
                let templates = self.synthesizer.templates();
                let meta = NarrativeMeta::degraded(
                    payload.stats(),
                    self.synthesizer.model_name(),
                    templates.tone(),
                    templates.length(),
                );
                (DEGRADED_NARRATIVE.to_string(), meta)
            }
        };

        trace.record(format!(
            "chart: {:?} with {} series",
            chart.chart_type,
            chart.series.len()
        ));

        let response = merge(insight, meta, payload, chart);
        trace.record("merge: response ready");

        info!(
            mode = %valid.mode,
            days = valid.days,
            records = response.data.stats().record_count(),
            fallback_used = trace.fallback_used,
            degraded = trace.degraded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Insight request completed"
        );

        Ok(InsightOutcome { response, trace })
    }
}

fn merge(
    insight: String,
    meta: NarrativeMeta,
    data: InsightPayload,
    chart: ChartSpec,
) -> InsightResponse {
    let (hero, references, recs) = match data.mode() {
        Mode::Energy => (data.mirror().map(Hero::from_mirror), None, None),
        Mode::Longevity => (
            None,
            Some(longevity_references()),
            Some(recommendations(data.stats())),
        ),
    };

    InsightResponse {
        insight,
        hero,
        data,
        chart,
        narrative: meta,
        references,
        recommendations: recs,
    }
}
