//! Batch order handler

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use troublebox_engine::Intensity;

/// Order dispatch response
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub status: String,
    pub mode: Intensity,
    pub scheduled_count: u64,
}

/// Schedule a batch of orders sized by `mode`. Returns once the workers are
/// started; completion is only visible through the metrics.
pub async fn place_order(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let mode: Intensity = mode.parse()?;
    let receipt = state.engine.dispatch(mode)?;

    tracing::info!(mode = %mode, scheduled = receipt.scheduled, "Order batch dispatched");

    Ok(Json(OrderResponse {
        status: "dispatched".to_string(),
        mode,
        scheduled_count: receipt.scheduled,
    }))
}
