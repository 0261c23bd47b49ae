//! Errors raised by remote classification.
//!
//! None of these reach the caller of the classification entry point; they
//! are logged and masked by the local fallback.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No credential or provider configured.
    #[error("remote classifier unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The backend answered but no usable payload could be extracted.
    #[error("unparseable response: {0}")]
    Parse(String),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote call cancelled")]
    Cancelled,
}

impl ClassifyError {
    /// Whether a retry with backoff makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Transient HTTP statuses worth retrying.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

pub type Result<T> = std::result::Result<T, ClassifyError>;
