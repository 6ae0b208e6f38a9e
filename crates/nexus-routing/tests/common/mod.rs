//! Shared fixtures for nexus-routing integration tests
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    reason = "Test allows"
)]

use nexus_core::{Clock, Complexity, ManualClock, ProviderKind, Request, Response};
use nexus_routing::{
    CacheStats, HistoryEntry, ProviderProfile, ProviderRouter, ResponseStore, Result,
    RoutingDecision, RoutingError, RoutingStrategy,
};
use std::env;
use std::sync::{Arc, Once};
use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests (idempotent).
/// Honors `RUST_LOG` if set, otherwise defaults to "debug".
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_owned());
        if fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_test_writer()
            .try_init()
            .is_err()
        {
            // tracing already initialized in this process
        }
    });
}

/// The moderate code-generation request used across routing scenarios
pub fn fibonacci_request(id: &str) -> Request {
    Request::new("Generate a fibonacci function")
        .with_id(id)
        .with_task_type("code_generation")
        .with_complexity(Complexity::Moderate)
        .with_priority(3)
}

/// Manual clock plus the same clock as a trait object
pub fn manual_clock() -> (Arc<ManualClock>, Arc<dyn Clock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let shared: Arc<dyn Clock> = Arc::<ManualClock>::clone(&clock);
    (clock, shared)
}

/// A profile that loses to every built-in provider
pub fn weak_profile() -> ProviderProfile {
    ProviderProfile::uniform(0.1)
        .with_cost(0.1)
        .with_performance(0.1)
        .with_quality(0.1)
        .with_availability(0.1)
}

/// Store whose every operation fails
pub struct BrokenStore;

impl ResponseStore for BrokenStore {
    fn lookup(&self, _request: &Request) -> Result<Option<Response>> {
        Err(RoutingError::Cache("backend offline".to_owned()))
    }

    fn store(&self, _request: &Request, _response: &Response) -> Result<()> {
        Err(RoutingError::Cache("backend offline".to_owned()))
    }

    fn sweep(&self) -> Result<usize> {
        Err(RoutingError::Cache("backend offline".to_owned()))
    }

    fn len(&self) -> Result<usize> {
        Err(RoutingError::Cache("backend offline".to_owned()))
    }

    fn stats(&self) -> Result<CacheStats> {
        Err(RoutingError::Cache("backend offline".to_owned()))
    }
}

/// Router that always picks one provider and offers no alternatives
pub struct FixedRouter(pub ProviderKind);

impl ProviderRouter for FixedRouter {
    fn rank(
        &self,
        _request: &Request,
        _available: &[ProviderKind],
        strategy: RoutingStrategy,
    ) -> Result<RoutingDecision> {
        Ok(RoutingDecision {
            selected_provider: self.0,
            confidence_score: 1.0,
            reasoning: format!("fixed choice under {strategy}"),
            alternatives: Vec::new(),
            estimated_cost: 0.0,
            estimated_time: 0.0,
        })
    }

    fn history(&self) -> Vec<HistoryEntry> {
        Vec::new()
    }
}
