use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ProviderKind, Request, Response, Result};

/// Running performance figures reported by a provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Mean seconds per completed call.
    pub avg_response_time: f64,
    /// Fraction of calls that succeeded.
    pub success_rate: f64,
    /// Fraction of calls that failed.
    pub error_rate: f64,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            avg_response_time: 0.0,
            success_rate: 1.0,
            error_rate: 0.0,
        }
    }
}

/// Adapter over one completion backend.
///
/// A failure must come back as `Err`, never as an `Ok` response that merely
/// looks degraded, so the orchestrator can fall back to the next provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Identity of the backend this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Produces a completion for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the request,
    /// times out, or answers with something that cannot be interpreted.
    async fn process_request(&self, request: &Request) -> Result<Response>;

    /// Checks whether the backend is ready to take work.
    async fn check_availability(&self) -> bool;

    /// Reports the adapter's own view of its performance.
    fn performance_metrics(&self) -> PerformanceMetrics;
}
