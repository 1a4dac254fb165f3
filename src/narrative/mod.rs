//! Narrative Synthesizer
//!
//! Turns an assembled payload into prose. Two backends exist:
//!
//! - **mock**: deterministic template rendering
//! - **live**: a hosted completion model, falling back to templates per
//!   request on any failure
//!
//! The backend is chosen once, when the synthesizer is built from config,
//! and never re-evaluated.

pub mod client;
pub mod error;
pub mod live;
pub mod mock;
pub mod templates;

pub use client::{CompletionBackend, CompletionClientConfig, HttpCompletionClient};
pub use error::{CompletionError, NarrativeError, TemplateError};
pub use live::LiveGenerator;
pub use mock::{MockGenerator, TEMPLATE_MODEL_NAME};
pub use templates::{render, BoundValues, TemplateId};

use crate::assembler::InsightPayload;
use crate::config::NarrativeConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Maximum key takeaways in a result
pub const MAX_TAKEAWAYS: usize = 3;

/// Maximum insights passed through to a result
pub const MAX_INSIGHTS_USED: usize = 5;

/// Voice of the narrative
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Technical,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Technical => "technical",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "technical" => Ok(Tone::Technical),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// Target narrative length
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Length::Short),
            "medium" => Ok(Length::Medium),
            "long" => Ok(Length::Long),
            other => Err(format!("unknown length '{}'", other)),
        }
    }
}

/// Synthesized narrative
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NarrativeResult {
    pub narrative: String,
    pub summary: String,
    /// At most three
    pub key_takeaways: Vec<String>,
    /// At most five
    pub insights_used: Vec<String>,
    pub tone: Tone,
    pub length: Length,
    pub model_name: String,
    pub fallback_used: bool,
}

/// Which backend a synthesizer was built with
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Mock,
    Live,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Mock => "mock",
            BackendKind::Live => "live",
        }
    }
}

/// Narrative synthesizer, fixed to one backend for its lifetime
#[derive(Debug, Clone)]
pub enum NarrativeSynthesizer {
    Mock(MockGenerator),
    Live(LiveGenerator),
}

impl NarrativeSynthesizer {
    /// Select the backend: live iff a non-empty API key is configured
    pub fn from_config(config: &NarrativeConfig) -> Result<Self, NarrativeError> {
        let mut templates = MockGenerator::new(config.tone, config.length);
        if let Some(closing) = config.closing.as_deref().filter(|c| !c.trim().is_empty()) {
            templates = templates.with_closing(closing);
        }

        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                tracing::info!(tone = config.tone.as_str(), "Narrative backend: templates");
                return Ok(NarrativeSynthesizer::Mock(templates));
            }
        };

        let client = HttpCompletionClient::new(CompletionClientConfig {
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            timeout_ms: config.timeout_ms,
            temperature: config.temperature,
        })?;

        tracing::info!(
            model = %config.model,
            timeout_ms = config.timeout_ms,
            "Narrative backend: live completion"
        );

        Ok(NarrativeSynthesizer::Live(LiveGenerator::new(
            Arc::new(client),
            Duration::from_millis(config.timeout_ms),
            templates,
        )))
    }

    /// Live synthesizer over an arbitrary backend
    pub fn live(backend: Arc<dyn CompletionBackend>, timeout: Duration, templates: MockGenerator) -> Self {
        NarrativeSynthesizer::Live(LiveGenerator::new(backend, timeout, templates))
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            NarrativeSynthesizer::Mock(_) => BackendKind::Mock,
            NarrativeSynthesizer::Live(_) => BackendKind::Live,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            NarrativeSynthesizer::Mock(_) => TEMPLATE_MODEL_NAME,
            NarrativeSynthesizer::Live(live) => live.model_name(),
        }
    }

    /// Template generator, also the fallback of the live backend
    pub fn templates(&self) -> &MockGenerator {
        match self {
            NarrativeSynthesizer::Mock(mock) => mock,
            NarrativeSynthesizer::Live(live) => live.templates(),
        }
    }

    /// Produce the narrative for a payload
    pub async fn synthesize(
        &self,
        query: &str,
        payload: &InsightPayload,
    ) -> Result<NarrativeResult, NarrativeError> {
        match self {
            NarrativeSynthesizer::Mock(mock) => Ok(mock.generate(query, payload)?),
            NarrativeSynthesizer::Live(live) => live.generate(query, payload).await,
        }
    }
}

impl Default for NarrativeSynthesizer {
    fn default() -> Self {
        NarrativeSynthesizer::Mock(MockGenerator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{InsightAssembler, Mode};
    use crate::stats::StatisticsEngine;

    #[test]
    fn test_tone_and_length_parsing() {
        assert_eq!("Casual".parse::<Tone>().unwrap(), Tone::Casual);
        assert_eq!("long".parse::<Length>().unwrap(), Length::Long);
        assert!("shouty".parse::<Tone>().is_err());
        assert_eq!(Tone::default(), Tone::Professional);
        assert_eq!(Length::default(), Length::Medium);
        assert_eq!(serde_json::to_string(&Tone::Technical).unwrap(), "\"technical\"");
    }

    #[test]
    fn test_mock_selected_without_key() {
        let synth = NarrativeSynthesizer::from_config(&NarrativeConfig::default()).unwrap();
        assert_eq!(synth.backend(), BackendKind::Mock);
        assert_eq!(synth.model_name(), TEMPLATE_MODEL_NAME);

        let blank = NarrativeConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        let synth = NarrativeSynthesizer::from_config(&blank).unwrap();
        assert_eq!(synth.backend(), BackendKind::Mock);
    }

    #[test]
    fn test_live_selected_with_key() {
        let config = NarrativeConfig {
            api_key: Some("sk-test".to_string()),
            model: "test-model".to_string(),
            ..Default::default()
        };
        let synth = NarrativeSynthesizer::from_config(&config).unwrap();
        assert_eq!(synth.backend(), BackendKind::Live);
        assert_eq!(synth.model_name(), "test-model");
    }

    #[test]
    fn test_closing_from_config() {
        let config = NarrativeConfig {
            closing: Some("Done.".to_string()),
            ..Default::default()
        };
        let synth = NarrativeSynthesizer::from_config(&config).unwrap();
        assert_eq!(
            synth.templates(),
            &MockGenerator::default().with_closing("Done.")
        );

        let blank = NarrativeConfig {
            closing: Some("  ".to_string()),
            ..Default::default()
        };
        let synth = NarrativeSynthesizer::from_config(&blank).unwrap();
        assert_eq!(synth.templates(), &MockGenerator::default());
    }

    #[tokio::test]
    async fn test_mock_synthesize() {
        let bundle = StatisticsEngine::new().analyze(Vec::new());
        let payload = InsightAssembler::new().assemble(Mode::Longevity, bundle, "q");
        let result = NarrativeSynthesizer::default()
            .synthesize("q", &payload)
            .await
            .unwrap();

        assert!(!result.fallback_used);
        assert_eq!(result.tone, Tone::Professional);
        assert_eq!(result.length, Length::Medium);
    }
}
