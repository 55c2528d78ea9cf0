use serde::Serialize;
use std::fmt;

use crate::{catalog::CatalogError, questions::commands::QuestionSourceError};

/// Error shape returned across the command boundary: an HTTP-equivalent
/// status plus a message for the player or the admin tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
}

impl ApiError {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}

impl std::error::Error for ApiError {}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<QuestionSourceError> for ApiError {
    fn from(err: QuestionSourceError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}
