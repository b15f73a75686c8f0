//! HTTP API for the troublebox daemon

pub mod rest;

pub use rest::create_router;
