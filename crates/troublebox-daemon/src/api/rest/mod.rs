//! REST endpoints: load triggers, status, and metrics exposition

pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
