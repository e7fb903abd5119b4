//! Question supply error types

use std::time::Duration;

/// Question supply error types
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    // Storage errors
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    // Remote generator errors
    #[error("transport error: {0}")]
    RemoteTransport(String),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The generator answered with an explicit error payload. The message is
    /// surfaced verbatim.
    #[error("{0}")]
    RemoteApplication(String),

    // Supply errors
    #[error("insufficient questions: wanted {wanted}, got {got}")]
    InsufficientQuestions { wanted: usize, got: usize },

    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SupplyError {
    /// Whether a retry at the transport level may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SupplyError::RemoteTransport(_) | SupplyError::RateLimited { .. }
        )
    }

    /// Provider-supplied back-off hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SupplyError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether this error is presented to the player as a terminal error state.
    ///
    /// Transport failures and short batches are fatal only when they reach the
    /// last tier, and even then they are reported as a failed load rather than
    /// a verbatim message.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            SupplyError::StorageUnavailable(_) | SupplyError::RemoteApplication(_)
        )
    }
}

impl From<std::io::Error> for SupplyError {
    fn from(err: std::io::Error) -> Self {
        SupplyError::StorageUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for SupplyError {
    fn from(err: reqwest::Error) -> Self {
        SupplyError::RemoteTransport(err.to_string())
    }
}

/// Result type alias for question supply operations
pub type Result<T> = std::result::Result<T, SupplyError>;
