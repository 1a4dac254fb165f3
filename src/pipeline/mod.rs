//! Insight pipeline
//!
//! Request validation, stage orchestration and the merged response.

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod response;

pub use error::{PipelineError, PipelineResult, ValidationError};
pub use orchestrator::InsightOrchestrator;
pub use request::{sanitize_input, validate_query, InsightRequest, ValidatedRequest};
pub use response::{
    Hero, InsightOutcome, InsightResponse, NarrativeMeta, PipelineTrace, Reference,
    DEGRADED_NARRATIVE,
};
