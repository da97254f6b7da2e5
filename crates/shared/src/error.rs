use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the submission endpoint on a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a known survey type")]
pub struct UnknownSurveyType(pub String);
