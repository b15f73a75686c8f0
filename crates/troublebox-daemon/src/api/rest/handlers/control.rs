//! Process control handlers

use axum::http::StatusCode;

/// Exit status used by the killswitch
pub const KILLSWITCH_EXIT_CODE: i32 = 1;

/// Terminate the process immediately, without graceful shutdown. Detached
/// load workers die with it.
pub async fn killswitch() -> StatusCode {
    tracing::warn!("Killswitch triggered, terminating process");
    std::process::exit(KILLSWITCH_EXIT_CODE)
}
