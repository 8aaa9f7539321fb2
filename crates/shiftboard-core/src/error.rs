use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShiftboardError {
    #[error("not initialized: run 'shiftboard init'")]
    NotInitialized,

    #[error("line not found: {0}")]
    LineNotFound(u32),

    #[error("invalid count '{0}': must be an integer")]
    InvalidCount(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ShiftboardError>;

/// Parse an operator-supplied count (day plan or actual) arriving as a
/// string from a form field or CLI argument.
pub fn parse_count(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ShiftboardError::InvalidCount(raw.to_string()))
}
