// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointerError {
    /// The estimator handed over a partial hand; the frame is skipped.
    #[error("malformed frame: expected {expected} landmarks, found {found}")]
    MalformedFrame { expected: usize, found: usize },

    #[error("pointer injection failed: {0}")]
    Injection(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("frame source error: {0}")]
    Source(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PointerError>;
