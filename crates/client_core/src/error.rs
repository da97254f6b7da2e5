use shared::domain::AdminLevel;
use thiserror::Error;

/// Contract violations rejected at the controller boundary. State is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("mouza position {position} is out of range (length {len})")]
    IndexOutOfRange { position: usize, len: usize },
    #[error("'{value}' is not a known survey type")]
    InvalidSurveyType { value: String },
    #[error("unknown mouza field '{0}'")]
    UnknownField(String),
    #[error("'{value}' is not one of the loaded {level} options")]
    UnknownOption { level: AdminLevel, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Transport(String),
    #[error("directory responded with status {status}")]
    Status { status: u16 },
    #[error("malformed directory response: {0}")]
    Decode(String),
    #[error("invalid directory url '{0}'")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// No response was received.
    #[error("submission did not complete: {0}")]
    NetworkFailure(String),
    #[error("server rejected submission ({status}): {message}")]
    ServerRejection { status: u16, message: String },
}

impl SubmitError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::NetworkFailure(_) => None,
            SubmitError::ServerRejection { status, .. } => Some(*status),
        }
    }
}
