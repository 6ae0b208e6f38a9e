use nexus_core::{Error as CoreError, ProviderKind};
use serde_json::Error as JsonError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::result::Result as StdResult;
use thiserror::Error;
use toml::de::Error as TomlDeError;
use toml::ser::Error as TomlSerError;

/// Result type for routing and orchestration.
pub type Result<T> = StdResult<T, RoutingError>;

/// One failed dispatch during a fallback walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    /// Provider that was tried.
    pub provider: ProviderKind,
    /// Why it failed.
    pub reason: String,
}

impl Display for FailedAttempt {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}: {}", self.provider, self.reason)
    }
}

/// Errors raised while routing or serving a request.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A provider failed to produce a response.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// A response was received but rejected by quality checks.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No providers, malformed input, or invalid settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The response store could not be read or written.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Every candidate provider, the local one included, failed.
    #[error("All providers failed: {}", join_attempts(.attempts))]
    AllProvidersFailed {
        /// Each failed dispatch, in the order it was tried.
        attempts: Vec<FailedAttempt>,
    },

    /// Filesystem failure while reading or writing configuration.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    /// Configuration file could not be parsed.
    #[error("Failed to parse config: {0}")]
    TomlDe(#[from] TomlDeError),

    /// Configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    TomlSer(#[from] TomlSerError),
}

fn join_attempts(attempts: &[FailedAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RoutingError {
    /// Whether this error is surfaced to callers as a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Io(_) | Self::TomlDe(_) | Self::TomlSer(_)
        )
    }

    /// Whether this error should move the orchestrator on to the next provider.
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Core(_) | Self::Validation(_))
    }
}
