//! # Aurora
//!
//! Insight pipeline for physiological time-series. A request names a query,
//! a mode and a window of days; the pipeline answers with statistics, a
//! mode-specific view, a chart description and a narrative.
//!
//! ## Pipeline
//!
//! request → store → statistics → assembler → (narrative ∥ chart) → response
//!
//! ## Modules
//!
//! - [`store`]: Record types and the read-only record store
//! - [`stats`]: Descriptive statistics, buckets, correlations, insights
//! - [`assembler`]: Mode-specific payloads, including the energy mirror view
//! - [`narrative`]: Template and hosted-model narrative synthesis
//! - [`chart`]: Chart specification builder
//! - [`pipeline`]: Request validation and stage orchestration
//! - [`api`]: REST API server with Axum
//! - [`config`], [`logging`]: Configuration and tracing setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aurora::narrative::NarrativeSynthesizer;
//! use aurora::pipeline::{InsightOrchestrator, InsightRequest};
//! use aurora::assembler::Mode;
//! use aurora::config::PipelineConfig;
//! use aurora::store::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::sample(chrono::Utc::now().date_naive()));
//!     let orchestrator = InsightOrchestrator::new(
//!         store,
//!         Arc::new(NarrativeSynthesizer::default()),
//!         PipelineConfig::default(),
//!     );
//!
//!     let request = InsightRequest::new("How is my recovery?", Mode::Energy).with_days(7);
//!     let outcome = orchestrator.handle(&request).await?;
//!
//!     println!("{}", outcome.response.insight);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assembler;
pub mod chart;
pub mod config;
pub mod logging;
pub mod narrative;
pub mod pipeline;
pub mod stats;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    DayWindow, InMemoryStore, NumericField, PhysiologicalRecord, StoreError, StoreResult,
    TimeSeriesStore,
};

pub use stats::{CorrelationSet, StatSummary, StatisticsEngine, StatsBundle};

pub use assembler::{InsightAssembler, InsightPayload, MirrorInsight, Mode};

pub use narrative::{
    BackendKind, CompletionBackend, HttpCompletionClient, Length, NarrativeError,
    NarrativeResult, NarrativeSynthesizer, Tone,
};

pub use chart::{ChartSpec, ChartSpecBuilder, ChartType};

pub use pipeline::{
    InsightOrchestrator, InsightOutcome, InsightRequest, InsightResponse, PipelineError,
    PipelineTrace,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, NarrativeConfig, PipelineConfig};
