//! Insight Routes
//!
//! - POST /api/insight - Run the full pipeline for a query
//! - POST /api/debug-flow - Run the pipeline and return its stage log

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::DebugFlowResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::pipeline::{InsightRequest, InsightResponse};

/// POST /api/insight
///
/// Statistics, mode-specific view, chart and narrative for a query.
/// Validation failures return 400 before any data is read.
pub async fn generate_insight(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InsightRequest>, JsonRejection>,
) -> ApiResult<Json<InsightResponse>> {
    let req = request_body(body)?;
    let outcome = state.orchestrator.handle(&req).await?;
    Ok(Json(outcome.response))
}

/// POST /api/debug-flow
///
/// Same pipeline as `/api/insight`; returns only the ordered stage log.
pub async fn debug_flow(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InsightRequest>, JsonRejection>,
) -> ApiResult<Json<DebugFlowResponse>> {
    let req = request_body(body)?;
    let outcome = state.orchestrator.handle(&req).await?;
    tracing::debug!(
        stages = outcome.trace.stages.len(),
        backend = outcome.trace.backend.as_str(),
        "Debug flow traced"
    );
    Ok(Json(outcome.trace.stages))
}

/// Malformed or mistyped bodies are validation errors
fn request_body(body: Result<Json<InsightRequest>, JsonRejection>) -> ApiResult<InsightRequest> {
    body.map(|Json(req)| req)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}
