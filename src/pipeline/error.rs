//! Pipeline error types

use crate::store::StoreError;
use thiserror::Error;

/// Request rejected before any computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown mode '{0}', expected one of: energy, longevity")]
    UnknownMode(String),

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("query is {len} characters, maximum is {max}")]
    QueryTooLong { len: usize, max: usize },

    #[error("days must be at least 1, got {0}")]
    InvalidDays(i64),
}

/// Errors surfaced by the orchestrator
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
