use std::fmt;

use ecosort_identify::IdentifyError;

/// Unified error type for the ecosort crate.
#[derive(Debug, Clone)]
pub enum CoreError {
    /// Invalid input provided by the caller.
    InvalidInput(String),
    /// The named item does not exist.
    NotFound(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            CoreError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<IdentifyError> for CoreError {
    fn from(err: IdentifyError) -> Self {
        match err {
            IdentifyError::InvalidInput(msg) | IdentifyError::Config(msg) => {
                CoreError::InvalidInput(msg)
            }
            IdentifyError::Http(error) => CoreError::Internal(error.to_string()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
