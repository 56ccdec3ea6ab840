use std::time::Duration;

use thiserror::Error;

/// Local, recoverable. A rejected candidate never mutates workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported media type `{media_type}`, accepted: {accepted}")]
    UnsupportedMediaType { media_type: String, accepted: String },
    #[error("file too large: {size_bytes} bytes, max {max_bytes} bytes")]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },
    #[error("file is empty")]
    EmptyFile,
}

/// External, recoverable. The workflow reverts to the selected file so the
/// user can resubmit; retry is never automatic.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned status {0}")]
    Status(u16),
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}
