//! Per-provider dispatch metrics.
//!
//! Successes and failures are tallied for every dispatch the orchestrator
//! makes; cache hits never reach a provider and are not counted.

/// Metrics collection
pub mod collector;

pub use collector::{MetricsCollector, ProviderStats};
