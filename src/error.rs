use thiserror::Error;

/// Main error type for the optimizer
#[derive(Error, Debug)]
pub enum PropEdgeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Input data errors
    #[error("Invalid prop data: {0}")]
    InvalidPropData(String),

    #[error("Empty prop pool: {0}")]
    EmptyPool(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for PropEdgeError
pub type Result<T> = std::result::Result<T, PropEdgeError>;

impl From<crate::strategy::validate::LineupViolation> for PropEdgeError {
    fn from(err: crate::strategy::validate::LineupViolation) -> Self {
        PropEdgeError::Validation(err.to_string())
    }
}
