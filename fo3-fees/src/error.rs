//! Error types for the fees library

use thiserror::Error;

/// Custom error type for fee and limit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid fee policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid transfer limits: {0}")]
    InvalidLimits(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for fee and limit operations
pub type Result<T> = std::result::Result<T, Error>;
