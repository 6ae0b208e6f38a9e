//! Metrics collection for tracking provider dispatch statistics.

use nexus_core::{IgnoreLock as _, PerformanceMetrics, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Running tallies for one provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Dispatches that produced an accepted response
    pub successes: u64,
    /// Dispatches that errored or failed validation
    pub failures: u64,
    /// Seconds spent across all dispatches
    pub total_latency: f64,
    /// USD reported by accepted responses
    pub total_cost: f64,
}

impl ProviderStats {
    /// Total dispatches
    pub const fn attempts(&self) -> u64 {
        self.successes + self.failures
    }

    /// Fraction of dispatches that succeeded; 1.0 before any dispatch
    pub fn success_rate(&self) -> f64 {
        match self.attempts() {
            0 => 1.0,
            attempts => self.successes as f64 / attempts as f64,
        }
    }

    /// Fraction of dispatches that failed
    pub fn error_rate(&self) -> f64 {
        1.0 - self.success_rate()
    }

    /// Mean seconds per dispatch
    pub fn avg_response_time(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            attempts => self.total_latency / attempts as f64,
        }
    }

    /// These tallies in the provider-facing shape
    pub fn performance(&self) -> PerformanceMetrics {
        PerformanceMetrics {
            avg_response_time: self.avg_response_time(),
            success_rate: self.success_rate(),
            error_rate: self.error_rate(),
        }
    }
}

/// Collects dispatch outcomes per provider
#[derive(Debug, Default)]
pub struct MetricsCollector {
    stats: Mutex<BTreeMap<ProviderKind, ProviderStats>>,
}

impl MetricsCollector {
    /// Creates an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted response
    pub fn record_success(&self, kind: ProviderKind, latency: f64, cost: f64) {
        let mut stats = self.stats.lock_ignore_poison();
        let entry = stats.entry(kind).or_default();
        entry.successes += 1;
        entry.total_latency += latency;
        entry.total_cost += cost;
    }

    /// Records a failed dispatch
    pub fn record_failure(&self, kind: ProviderKind, latency: f64) {
        let mut stats = self.stats.lock_ignore_poison();
        let entry = stats.entry(kind).or_default();
        entry.failures += 1;
        entry.total_latency += latency;
    }

    /// Tallies for `kind`; zeroed if it was never dispatched
    pub fn stats_for(&self, kind: ProviderKind) -> ProviderStats {
        self.stats
            .lock_ignore_poison()
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Tallies for every provider dispatched so far
    pub fn snapshot(&self) -> BTreeMap<ProviderKind, ProviderStats> {
        self.stats.lock_ignore_poison().clone()
    }

    /// Clears all metrics
    pub fn clear(&self) {
        self.stats.lock_ignore_poison().clear();
    }
}
