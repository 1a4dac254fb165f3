//! Physiological Record Store
//!
//! Read-only access to the HRV and stress samples the pipeline analyzes.
//!
//! - **types**: `PhysiologicalRecord`, `NumericField`, `DayWindow`
//! - **memory**: In-memory snapshot store and the built-in sample dataset
//! - **error**: Error types
//!
//! The store has no logic of its own beyond selecting the requested window.
//! Every request reads the same snapshot; nothing here is mutated after
//! startup.

pub mod error;
pub mod memory;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use types::{DayWindow, NumericField, PhysiologicalRecord};

use async_trait::async_trait;

/// Source of physiological records for a trailing window of days
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Short name used in logs and health output
    fn name(&self) -> &str;

    /// Records for the last `days` calendar days, oldest first
    ///
    /// May return fewer records than the window implies.
    async fn get_records(&self, days: u32) -> StoreResult<Vec<PhysiologicalRecord>>;
}
