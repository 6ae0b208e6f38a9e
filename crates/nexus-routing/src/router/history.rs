use chrono::{DateTime, Utc};
use nexus_core::{Complexity, IgnoreLock as _, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of routing decisions kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// One logged routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Request that was routed.
    pub request_id: String,
    /// Provider selected.
    pub provider: ProviderKind,
    /// Winning score.
    pub score: f64,
    /// Estimated USD cost.
    pub estimated_cost: f64,
    /// Estimated seconds.
    pub estimated_time: f64,
    /// Declared complexity of the request.
    pub complexity: Complexity,
    /// Request priority.
    pub priority: u8,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
}

/// Bounded log of recent routing decisions. The oldest entry is dropped first.
#[derive(Debug)]
pub struct RoutingHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for RoutingHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RoutingHistory {
    /// Creates a log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY))),
            capacity,
        }
    }

    /// Appends `entry`, evicting the oldest entries beyond capacity.
    pub fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock_ignore_poison();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Snapshot of the log, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.lock_ignore_poison().iter().cloned().collect()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock_ignore_poison().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize) -> HistoryEntry {
        HistoryEntry {
            request_id: format!("req-{index}"),
            provider: ProviderKind::Google,
            score: 0.8,
            estimated_cost: 0.01,
            estimated_time: 2.5,
            complexity: Complexity::Moderate,
            priority: 3,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let history = RoutingHistory::with_capacity(3);
        for index in 0..5 {
            history.record(entry(index));
        }

        let ids: Vec<String> = history
            .snapshot()
            .into_iter()
            .map(|logged| logged.request_id)
            .collect();
        assert_eq!(ids, vec!["req-2", "req-3", "req-4"]);
    }

    #[test]
    fn test_default_capacity_is_one_thousand() {
        let history = RoutingHistory::default();
        assert!(history.is_empty());
        for index in 0..1005 {
            history.record(entry(index));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(
            history.snapshot().first().map(|logged| logged.request_id.clone()),
            Some("req-5".to_owned())
        );
    }
}
