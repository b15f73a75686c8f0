//! Prometheus exposition handler

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, http::header, response::IntoResponse};
use troublebox_engine::metrics::CONTENT_TYPE;

/// Render every registered metric in the text exposition format
pub async fn export_metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.engine.export_metrics()?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}
