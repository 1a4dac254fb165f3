//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not pipeline
//! types themselves. Insight requests and responses reuse
//! `pipeline::InsightRequest` and `pipeline::InsightResponse` directly.

use crate::store::PhysiologicalRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// RECORDS DTOs
// ============================================

/// Query parameters for GET /api/records
#[derive(Debug, Deserialize)]
pub struct RecordsParams {
    /// Window size in days (1-30), defaults to 7
    #[serde(default)]
    pub days: Option<i64>,
}

/// Records for a window with field averages
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub data: Vec<PhysiologicalRecord>,
    pub count: usize,
    pub days: u32,
    /// `avg_<field>` for every field with at least one value
    pub metrics: BTreeMap<String, f64>,
}

// ============================================
// DEBUG DTOs
// ============================================

/// Stage log returned by POST /api/debug-flow
pub type DebugFlowResponse = Vec<String>;

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Store status: "ok" or "error"
    pub store: String,
    /// Narrative backend: "mock" or "live"
    pub narrative_backend: String,
    /// Model used for narratives
    pub model: String,
    /// Seconds since server start
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
