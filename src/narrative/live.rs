//! Completion-backed narrative generator with template fallback

use super::client::CompletionBackend;
use super::error::{CompletionError, NarrativeError};
use super::mock::MockGenerator;
use super::{NarrativeResult, MAX_INSIGHTS_USED, MAX_TAKEAWAYS};
use crate::assembler::InsightPayload;
use crate::store::NumericField;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Generator that asks a completion backend for the narrative
///
/// Any backend failure falls back to the template path for that request.
#[derive(Clone)]
pub struct LiveGenerator {
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
    fallback: MockGenerator,
}

impl std::fmt::Debug for LiveGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveGenerator")
            .field("model", &self.backend.model_name())
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Shape the model is asked to reply with
#[derive(Debug, Deserialize)]
struct LiveReply {
    narrative: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    key_takeaways: Vec<String>,
}

impl LiveGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>, timeout: Duration, fallback: MockGenerator) -> Self {
        Self {
            backend,
            timeout,
            fallback,
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Template generator used on fallback
    pub fn templates(&self) -> &MockGenerator {
        &self.fallback
    }

    /// Generate via the backend, falling back to templates on failure
    pub async fn generate(
        &self,
        query: &str,
        payload: &InsightPayload,
    ) -> Result<NarrativeResult, NarrativeError> {
        match self.try_live(query, payload).await {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(
                    error = %err,
                    model = self.model_name(),
                    "Narrative backend failed, using template fallback"
                );
                let mut result = self.fallback.generate(query, payload)?;
                result.fallback_used = true;
                Ok(result)
            }
        }
    }

    async fn try_live(
        &self,
        query: &str,
        payload: &InsightPayload,
    ) -> Result<NarrativeResult, CompletionError> {
        let prompt = self.prompt(query);
        let context = completion_context(payload);

        let raw = tokio::time::timeout(self.timeout, self.backend.complete(&prompt, &context))
            .await
            .map_err(|_| CompletionError::Timeout(self.timeout.as_millis() as u64))??;

        let reply = parse_reply(&raw)?;
        debug!(
            model = self.model_name(),
            chars = reply.narrative.len(),
            "Received live narrative"
        );

        let insights = &payload.stats().insights;
        let key_takeaways: Vec<String> = if reply.key_takeaways.is_empty() {
            insights.iter().take(MAX_TAKEAWAYS).cloned().collect()
        } else {
            reply.key_takeaways.into_iter().take(MAX_TAKEAWAYS).collect()
        };
        let summary = reply
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| first_sentence(&reply.narrative));

        Ok(NarrativeResult {
            narrative: reply.narrative,
            summary,
            key_takeaways,
            insights_used: insights.iter().take(MAX_INSIGHTS_USED).cloned().collect(),
            tone: self.fallback.tone(),
            length: self.fallback.length(),
            model_name: self.model_name().to_string(),
            fallback_used: false,
        })
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            "The user asked: \"{}\".\nWrite a {} narrative in a {} tone that answers the \
             question using only the statistics in the context.",
            query,
            self.fallback.length().as_str(),
            self.fallback.tone().as_str()
        )
    }
}

/// Structured context sent alongside the prompt
fn completion_context(payload: &InsightPayload) -> serde_json::Value {
    let stats = payload.stats();
    let mut context = json!({
        "mode": payload.mode(),
        "record_count": stats.record_count(),
        "average_hrv": stats.mean(NumericField::Hrv),
        "average_stress": stats.mean(NumericField::StressScore),
        "statistics": stats.statistics,
        "hrv_by_stress_level": stats.hrv_by_stress_level,
        "correlations": stats.correlations,
        "insights": stats.insights.iter().take(MAX_INSIGHTS_USED).collect::<Vec<_>>(),
    });

    if let (Some(mirror), Some(obj)) = (payload.mirror(), context.as_object_mut()) {
        obj.insert("coordination_score".to_string(), json!(mirror.coordination_score));
        obj.insert("energy_pattern".to_string(), json!(mirror.energy_pattern));
        obj.insert("mirror_trend".to_string(), json!(mirror.mirror_trend));
    }

    context
}

/// Parse model output, tolerating a surrounding markdown code fence
fn parse_reply(raw: &str) -> Result<LiveReply, CompletionError> {
    let body = strip_code_fence(raw);
    let reply: LiveReply =
        serde_json::from_str(body).map_err(|e| CompletionError::Malformed(e.to_string()))?;

    if reply.narrative.trim().is_empty() {
        return Err(CompletionError::Malformed("empty narrative".to_string()));
    }
    Ok(reply)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn first_sentence(text: &str) -> String {
    match text.find(". ") {
        Some(idx) => text[..=idx].to_string(),
        None => text.trim().to_string(),
    }
}
