//! Store error types

use thiserror::Error;

/// Errors that can occur while reading records
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested window is empty or negative
    #[error("Invalid window: {0} days")]
    InvalidWindow(u32),

    /// Backing source could not be read
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
