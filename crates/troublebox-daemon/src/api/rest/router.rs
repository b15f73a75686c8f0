//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        // Health and status
        .route("/healthz", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        // Exposition
        .route("/metrics", get(handlers::export_metrics))
        // Load triggers
        .route("/order/:mode", post(handlers::place_order))
        .route("/load/cpu/:mode", post(handlers::set_cpu_load))
        .route("/load/memory/:mode", post(handlers::set_memory_load))
        .route("/load/disk/:mode", post(handlers::set_disk_load))
        .route("/killswitch", post(handlers::killswitch))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
