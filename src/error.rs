//! Error types for the taxifare crate

use thiserror::Error;

/// Result type alias for taxifare operations
pub type Result<T> = std::result::Result<T, FareError>;

/// Main error type for the taxifare crate
#[derive(Error, Debug)]
pub enum FareError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Tracking error: {0}")]
    Tracking(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Component not fitted: {0}")]
    NotFitted(String),

    #[error("Pipeline not set: call set_pipeline before run")]
    PipelineNotSet,
}

impl From<polars::error::PolarsError> for FareError {
    fn from(err: polars::error::PolarsError) -> Self {
        FareError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for FareError {
    fn from(err: serde_json::Error) -> Self {
        FareError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for FareError {
    fn from(err: reqwest::Error) -> Self {
        FareError::Tracking(err.to_string())
    }
}
