//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::narrative::NarrativeSynthesizer;
use crate::pipeline::InsightOrchestrator;
use crate::store::TimeSeriesStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline that answers insight requests
    pub orchestrator: Arc<InsightOrchestrator>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: InsightOrchestrator, config: ApiConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Record store behind the pipeline
    pub fn store(&self) -> &Arc<dyn TimeSeriesStore> {
        self.orchestrator.store()
    }

    pub fn synthesizer(&self) -> &NarrativeSynthesizer {
        self.orchestrator.synthesizer()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
