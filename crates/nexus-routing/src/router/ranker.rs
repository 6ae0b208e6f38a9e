use super::features::FeatureExtractor;
use super::history::{HistoryEntry, RoutingHistory};
use super::profiles::{NEUTRAL_SCORE, ProviderProfile};
use super::scorer::ProviderScorer;
use super::strategy::RoutingStrategy;
use super::{ProviderRouter, RoutingDecision};
use crate::{Result, RoutingError};
use nexus_core::{Clock, Complexity, ProviderKind, Request};
use std::sync::Arc;
use tracing::{debug, info};

/// Most alternatives carried by a decision.
pub const MAX_ALTERNATIVES: usize = 3;

const LOCAL_ONLY_CLAUSE: &str = "Only the local provider is available";
const ENTERPRISE_CLAUSE: &str = "Enterprise-grade processing capabilities required";
const HIGH_PRIORITY_CLAUSE: &str = "High priority request requiring immediate attention";

/// Router that scores every candidate and ranks them.
pub struct ScoringRouter {
    scorer: ProviderScorer,
    extractor: FeatureExtractor,
    history: RoutingHistory,
    clock: Arc<dyn Clock>,
}

impl ScoringRouter {
    /// Creates a router from its parts.
    pub fn new(scorer: ProviderScorer, extractor: FeatureExtractor, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorer,
            extractor,
            history: RoutingHistory::default(),
            clock,
        }
    }

    /// Replaces the history log, e.g. to change its capacity.
    #[must_use]
    pub fn with_history(mut self, history: RoutingHistory) -> Self {
        self.history = history;
        self
    }

    fn estimates(&self, kind: ProviderKind, complexity: Complexity) -> (f64, f64) {
        let fallback;
        let profile = if let Some(profile) = self.scorer.profiles().get(kind) {
            profile
        } else {
            fallback = ProviderProfile::uniform(NEUTRAL_SCORE);
            &fallback
        };
        (
            profile.estimated_cost(complexity),
            profile.estimated_time(complexity),
        )
    }

    fn reasoning(selected: ProviderKind, request: &Request, strategy: RoutingStrategy) -> String {
        let mut clauses = vec![selected.selection_rationale()];
        if let Some(clause) = strategy.reasoning_clause() {
            clauses.push(clause);
        }
        if request.complexity == Complexity::Enterprise {
            clauses.push(ENTERPRISE_CLAUSE);
        }
        if request.priority >= 4 {
            clauses.push(HIGH_PRIORITY_CLAUSE);
        }
        format!("{}.", clauses.join(". "))
    }

    fn local_only(&self, request: &Request) -> RoutingDecision {
        let (estimated_cost, estimated_time) = self.estimates(ProviderKind::Local, request.complexity);
        RoutingDecision {
            selected_provider: ProviderKind::Local,
            confidence_score: 1.0,
            reasoning: format!(
                "{}. {LOCAL_ONLY_CLAUSE}.",
                ProviderKind::Local.selection_rationale()
            ),
            alternatives: Vec::new(),
            estimated_cost,
            estimated_time,
        }
    }

    fn log_decision(&self, request: &Request, decision: &RoutingDecision) {
        self.history.record(HistoryEntry {
            request_id: request.id.clone(),
            provider: decision.selected_provider,
            score: decision.confidence_score,
            estimated_cost: decision.estimated_cost,
            estimated_time: decision.estimated_time,
            complexity: request.complexity,
            priority: request.priority,
            timestamp: self.clock.now(),
        });
    }
}

impl ProviderRouter for ScoringRouter {
    fn rank(
        &self,
        request: &Request,
        available: &[ProviderKind],
        strategy: RoutingStrategy,
    ) -> Result<RoutingDecision> {
        let mut candidates = available.to_vec();
        candidates.sort_unstable();
        candidates.dedup();

        let decision = match candidates.as_slice() {
            [] => {
                return Err(RoutingError::Configuration(
                    "no providers available for routing".to_owned(),
                ));
            }
            [ProviderKind::Local] => self.local_only(request),
            _ => {
                let features = self.extractor.extract(request);
                debug!(request_id = %request.id, ?features, "Derived routing features");

                let mut scored: Vec<(ProviderKind, f64)> = candidates
                    .iter()
                    .map(|&kind| (kind, self.scorer.score(kind, &features, strategy).total))
                    .collect();
                // Stable: equal scores keep declaration order
                scored.sort_by(|left, right| right.1.total_cmp(&left.1));

                let mut ranked = scored.into_iter();
                let Some((selected, best_score)) = ranked.next() else {
                    return Err(RoutingError::Configuration(
                        "no providers available for routing".to_owned(),
                    ));
                };
                let (estimated_cost, estimated_time) = self.estimates(selected, request.complexity);

                RoutingDecision {
                    selected_provider: selected,
                    confidence_score: best_score,
                    reasoning: Self::reasoning(selected, request, strategy),
                    alternatives: ranked.take(MAX_ALTERNATIVES).collect(),
                    estimated_cost,
                    estimated_time,
                }
            }
        };

        info!(
            "Routing decision: {} | Score: {:.3} | Cost: ${:.4} | Time: {:.1}s | Strategy: {}",
            decision.selected_provider,
            decision.confidence_score,
            decision.estimated_cost,
            decision.estimated_time,
            strategy
        );
        self.log_decision(request, &decision);
        Ok(decision)
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserTierConfig;
    use crate::router::profiles::ProfileTable;
    use nexus_core::SystemClock;

    fn router_with(profiles: ProfileTable) -> ScoringRouter {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        ScoringRouter::new(
            ProviderScorer::new(profiles),
            FeatureExtractor::new(UserTierConfig::default(), Arc::clone(&clock)),
            clock,
        )
    }

    fn fibonacci() -> Request {
        Request::new("Generate a fibonacci function")
            .with_id("fib-1")
            .with_task_type("code_generation")
            .with_complexity(Complexity::Moderate)
            .with_priority(3)
    }

    #[test]
    fn test_empty_provider_list_is_configuration_error() {
        let router = router_with(ProfileTable::builtin());
        let outcome = router.rank(&fibonacci(), &[], RoutingStrategy::Balanced);
        assert!(matches!(outcome, Err(RoutingError::Configuration(_))));
        assert!(router.history().is_empty());
    }

    #[test]
    fn test_local_only_short_circuit() -> Result<()> {
        let router = router_with(ProfileTable::builtin());
        let decision = router.rank(
            &fibonacci(),
            &[ProviderKind::Local, ProviderKind::Local],
            RoutingStrategy::QualityOptimized,
        )?;

        assert_eq!(decision.selected_provider, ProviderKind::Local);
        assert!((decision.confidence_score - 1.0).abs() < f64::EPSILON);
        assert!(decision.alternatives.is_empty());
        assert_eq!(
            decision.reasoning,
            "Local processing selected for speed, cost savings, and privacy. \
             Only the local provider is available."
        );
        Ok(())
    }

    #[test]
    fn test_balanced_ranking_over_builtin_table() -> Result<()> {
        let router = router_with(ProfileTable::builtin());
        let decision = router.rank(&fibonacci(), &ProviderKind::ALL, RoutingStrategy::Balanced)?;

        assert_eq!(decision.selected_provider, ProviderKind::Local);
        assert_eq!(decision.alternatives.len(), 3);
        assert_eq!(
            decision.alternatives.last().map(|(kind, _)| *kind),
            Some(ProviderKind::Anthropic)
        );
        let scores: Vec<f64> = decision.alternatives.iter().map(|(_, score)| *score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(decision.confidence_score >= scores[0]);
        assert!(decision.estimated_cost.abs() < f64::EPSILON);
        assert!((decision.estimated_time - 1.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_reasoning_clauses() -> Result<()> {
        let router = router_with(ProfileTable::builtin());
        let request = fibonacci()
            .with_complexity(Complexity::Enterprise)
            .with_priority(5);
        let decision = router.rank(
            &request,
            &[ProviderKind::OpenAi, ProviderKind::Anthropic],
            RoutingStrategy::QualityOptimized,
        )?;

        assert!(decision.reasoning.starts_with(decision.selected_provider.selection_rationale()));
        assert!(decision.reasoning.contains("Quality optimization prioritized in selection"));
        assert!(decision.reasoning.contains("Enterprise-grade processing capabilities required"));
        assert!(decision.reasoning.ends_with("High priority request requiring immediate attention."));
        Ok(())
    }

    #[test]
    fn test_alternatives_capped_and_exclude_winner() -> Result<()> {
        let router = router_with(ProfileTable::empty());
        let decision = router.rank(&fibonacci(), &ProviderKind::ALL, RoutingStrategy::Balanced)?;

        // Neutral scores tie, so declaration order decides
        assert_eq!(decision.selected_provider, ProviderKind::OpenAi);
        let alternatives: Vec<ProviderKind> =
            decision.alternatives.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            alternatives,
            vec![ProviderKind::Anthropic, ProviderKind::Google, ProviderKind::Local]
        );
        assert!((decision.estimated_cost - 0.01).abs() < f64::EPSILON);
        assert!((decision.estimated_time - 3.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_decisions_are_logged() -> Result<()> {
        let router = router_with(ProfileTable::builtin());
        let first = router.rank(&fibonacci(), &ProviderKind::ALL, RoutingStrategy::Balanced)?;
        let second = router.rank(&fibonacci(), &ProviderKind::ALL, RoutingStrategy::Balanced)?;
        assert_eq!(first, second);

        let history = router.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].request_id, "fib-1");
        assert_eq!(history[0].provider, first.selected_provider);
        assert_eq!(history[0].priority, 3);
        Ok(())
    }
}
