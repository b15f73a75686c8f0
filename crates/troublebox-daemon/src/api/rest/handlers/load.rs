//! Sustained load trigger handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use troublebox_engine::{Intensity, LoadReceipt};

/// Sustained test response
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub status: String,
    pub mode: Intensity,
    pub intensity: u32,
}

impl From<LoadReceipt> for LoadResponse {
    fn from(receipt: LoadReceipt) -> Self {
        Self {
            status: "started".to_string(),
            mode: receipt.mode,
            intensity: receipt.intensity,
        }
    }
}

/// Disk write response
#[derive(Debug, Serialize)]
pub struct DiskLoadResponse {
    pub status: String,
    pub mode: Intensity,
}

/// Start a sustained CPU test
pub async fn set_cpu_load(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<Json<LoadResponse>> {
    let mode: Intensity = mode.parse()?;
    let receipt = state.engine.set_cpu_load(mode)?;
    tracing::info!(mode = %mode, intensity = receipt.intensity, "CPU load test started");
    Ok(Json(receipt.into()))
}

/// Start a sustained memory test
pub async fn set_memory_load(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<Json<LoadResponse>> {
    let mode: Intensity = mode.parse()?;
    let receipt = state.engine.set_memory_load(mode)?;
    tracing::info!(mode = %mode, intensity = receipt.intensity, "Memory load test started");
    Ok(Json(receipt.into()))
}

/// Write a single order file in the background
pub async fn set_disk_load(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<Json<DiskLoadResponse>> {
    let mode: Intensity = mode.parse()?;
    let mode = state.engine.set_disk_load(mode)?;
    tracing::info!(mode = %mode, "Disk load started");
    Ok(Json(DiskLoadResponse {
        status: "started".to_string(),
        mode,
    }))
}
