use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrcError {
    #[error("invalid DRC config field '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("DRC serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DrcError>;
