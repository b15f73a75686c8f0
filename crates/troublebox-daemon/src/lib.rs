//! Troublebox daemon library
//!
//! HTTP front end for the load engine:
//! - REST triggers for batch orders and sustained CPU, memory, and disk load
//! - Prometheus metrics exposition
//! - Server lifecycle and configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::create_router;
pub use api::rest::AppState;
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
