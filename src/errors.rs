use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("You need to sign in first")]
    AuthMissing,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected ({status}): {message}")]
    ServerRejection { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Conflict(#[from] DomainError),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl AppError {
    /// Client-side conflicts never reach the network and leave slices untouched.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}
