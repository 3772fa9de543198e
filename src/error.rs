//! Error types

use thiserror::Error;

/// Failure to build a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid logger: {0}")]
    InvalidLogger(String),
}

/// Failure reported by a logging backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown log level: {}", .0.as_deref().unwrap_or("<none>"))]
    UnknownLevel(Option<String>),

    #[error("logger unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
