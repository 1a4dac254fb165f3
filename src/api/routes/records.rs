//! Record Routes
//!
//! - GET /api/records?days=N - Raw records for a window with field averages

use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::{RecordsParams, RecordsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::stats::summarize;
use crate::store::{NumericField, PhysiologicalRecord};

const DEFAULT_DAYS: i64 = 7;
const MAX_DAYS: i64 = 30;

/// GET /api/records
pub async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordsParams>,
) -> ApiResult<Json<RecordsResponse>> {
    let days = params.days.unwrap_or(DEFAULT_DAYS);
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {}",
            MAX_DAYS
        )));
    }
    let days = days as u32;

    let records = state.store().get_records(days).await?;
    let metrics = field_averages(&records);

    Ok(Json(RecordsResponse {
        count: records.len(),
        days,
        metrics,
        data: records,
    }))
}

/// `avg_<field>` for every field with at least one value
fn field_averages(records: &[PhysiologicalRecord]) -> BTreeMap<String, f64> {
    let fields: Vec<NumericField> = NumericField::core()
        .iter()
        .chain(NumericField::extended())
        .copied()
        .collect();

    summarize(records, &fields)
        .into_iter()
        .filter_map(|(field, summary)| summary.mean.map(|m| (format!("avg_{}", field.name()), m)))
        .collect()
}
