use core::result::Result as CoreResult;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur in the core library and in provider adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// A provider failed to produce a response (network, auth, vendor rejection).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider is not reachable or refused to take work.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider call exceeded the adapter's own deadline.
    #[error("Provider timed out after {0}ms")]
    Timeout(u64),

    /// Provider returned a response that could not be interpreted.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// The request is missing required fields or carries out-of-range values.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient failures such as timeouts or provider-side errors.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Unavailable(_) | Self::Timeout(_)
        )
    }
}
