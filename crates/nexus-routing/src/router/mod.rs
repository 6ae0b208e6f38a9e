//! Provider selection.
//!
//! Requests are reduced to [`RequestFeatures`], every candidate provider is
//! scored against its static [`ProviderProfile`] under a [`RoutingStrategy`],
//! and the ranked result becomes a [`RoutingDecision`].

/// Request feature derivation
pub mod features;
/// Bounded routing decision log
pub mod history;
/// Static provider reference data
pub mod profiles;
/// Ranking router
pub mod ranker;
/// Per-provider scoring
pub mod scorer;
/// Strategy weight vectors
pub mod strategy;

use crate::Result;
use nexus_core::{ProviderKind, Request};
use serde::{Deserialize, Serialize};
use std::iter::once;

pub use features::{FeatureExtractor, RequestFeatures, TaskCategory, UserTier};
pub use history::{HistoryEntry, RoutingHistory};
pub use profiles::{ProfileTable, ProviderProfile};
pub use ranker::ScoringRouter;
pub use scorer::{ProviderScorer, ScoreBreakdown};
pub use strategy::{RoutingStrategy, StrategyWeights};

/// Ranked provider choice for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Highest-scoring provider.
    pub selected_provider: ProviderKind,
    /// Its score.
    pub confidence_score: f64,
    /// Human-readable justification.
    pub reasoning: String,
    /// Runners-up in descending score order, at most three.
    pub alternatives: Vec<(ProviderKind, f64)>,
    /// Estimated USD cost on the selected provider.
    pub estimated_cost: f64,
    /// Estimated seconds on the selected provider.
    pub estimated_time: f64,
}

impl RoutingDecision {
    /// Selected provider followed by the alternatives, in the order to try them.
    pub fn ranked_providers(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        once(self.selected_provider)
            .chain(self.alternatives.iter().map(|(kind, _)| *kind))
    }
}

/// Ranks candidate providers for a request.
pub trait ProviderRouter: Send + Sync {
    /// Scores and ranks `available` for `request` under `strategy`.
    ///
    /// # Errors
    /// Returns [`RoutingError::Configuration`](crate::RoutingError::Configuration)
    /// when `available` is empty.
    fn rank(
        &self,
        request: &Request,
        available: &[ProviderKind],
        strategy: RoutingStrategy,
    ) -> Result<RoutingDecision>;

    /// Recent decisions, oldest first.
    fn history(&self) -> Vec<HistoryEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_providers_order() {
        let decision = RoutingDecision {
            selected_provider: ProviderKind::Google,
            confidence_score: 0.9,
            reasoning: String::new(),
            alternatives: vec![(ProviderKind::Local, 0.8), (ProviderKind::OpenAi, 0.7)],
            estimated_cost: 0.01,
            estimated_time: 2.5,
        };
        let order: Vec<ProviderKind> = decision.ranked_providers().collect();
        assert_eq!(
            order,
            vec![ProviderKind::Google, ProviderKind::Local, ProviderKind::OpenAi]
        );
    }
}
