//! Aurora API Server
//!
//! Run with: cargo run --bin aurora-api
//!
//! # Configuration
//!
//! Read from the first config file found at
//! `~/.config/aurora/config.toml`, `/etc/aurora/config.toml` or
//! `./config.toml`, then overridden by `AURORA_*` environment variables.
//! `RUST_LOG` takes precedence over the configured log level.

use aurora::api::{serve, AppState};
use aurora::config::Config;
use aurora::narrative::NarrativeSynthesizer;
use aurora::pipeline::InsightOrchestrator;
use aurora::store::InMemoryStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = aurora::logging::with_bootstrap(Config::load_default);
    aurora::logging::init(&config.logging);

    tracing::info!("Starting Aurora API server v{}", env!("CARGO_PKG_VERSION"));

    let anchor = config
        .pipeline
        .sample_anchor
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let store = Arc::new(InMemoryStore::sample(anchor));
    tracing::info!(records = store.len(), %anchor, "Loaded sample dataset");

    // Backend is fixed for the life of the process
    let synthesizer = Arc::new(NarrativeSynthesizer::from_config(&config.narrative)?);

    let orchestrator = InsightOrchestrator::new(store, synthesizer, config.pipeline.clone());
    let state = AppState::new(orchestrator, config.api.clone());

    serve(state, &config.api).await?;

    tracing::info!("Aurora API server stopped");
    Ok(())
}
