//! Error types for troublebox-engine

use thiserror::Error;

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unrecognized severity name
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Disk write or worker spawn failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem capacity query failure
    #[error("Disk query error: {0}")]
    DiskQuery(String),

    /// Metric registration or encoding failure
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
