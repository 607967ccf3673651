//! Profile error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile configuration: {0}")]
    Config(String),

    #[error("profile JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProfileResult<T> = Result<T, ProfileError>;
