use super::features::RequestFeatures;
use super::profiles::{NEUTRAL_SCORE, ProfileTable, ProviderProfile};
use super::strategy::RoutingStrategy;
use nexus_core::ProviderKind;
use serde::{Deserialize, Serialize};

/// Complexity above which providers that excel on hard tasks get a bonus.
const HARD_TASK_THRESHOLD: f64 = 0.7;
/// Urgency above which the local provider's speed is boosted.
const URGENT_THRESHOLD: f64 = 0.8;
/// Cost sensitivity above which cheap providers are favoured.
const COST_SENSITIVE_THRESHOLD: f64 = 0.7;
/// Quality requirement above which premium providers are boosted.
const QUALITY_CRITICAL_THRESHOLD: f64 = 0.8;

/// The five sub-scores of one provider and their weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Category fit adjusted for complexity.
    pub capability: f64,
    /// Speed.
    pub performance: f64,
    /// Cheapness.
    pub cost: f64,
    /// Output quality.
    pub quality: f64,
    /// Expected uptime.
    pub availability: f64,
    /// Weighted sum under the strategy used.
    pub total: f64,
}

/// Pure scoring over a fixed profile table.
#[derive(Debug, Clone, Default)]
pub struct ProviderScorer {
    profiles: ProfileTable,
}

impl ProviderScorer {
    /// Creates a scorer over `profiles`.
    pub fn new(profiles: ProfileTable) -> Self {
        Self { profiles }
    }

    /// The profile table scores are drawn from.
    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Scores `kind` for a request with `features` under `strategy`.
    pub fn score(
        &self,
        kind: ProviderKind,
        features: &RequestFeatures,
        strategy: RoutingStrategy,
    ) -> ScoreBreakdown {
        let weights = strategy.weights();
        let mut breakdown = self.profiles.get(kind).map_or(
            ScoreBreakdown {
                capability: NEUTRAL_SCORE,
                performance: NEUTRAL_SCORE,
                cost: NEUTRAL_SCORE,
                quality: NEUTRAL_SCORE,
                availability: NEUTRAL_SCORE,
                total: 0.0,
            },
            |profile| Self::sub_scores(kind, profile, features),
        );

        breakdown.total = weights.availability.mul_add(
            breakdown.availability,
            weights.quality.mul_add(
                breakdown.quality,
                weights.cost.mul_add(
                    breakdown.cost,
                    weights.performance.mul_add(
                        breakdown.performance,
                        weights.capability * breakdown.capability,
                    ),
                ),
            ),
        );
        breakdown
    }

    fn sub_scores(
        kind: ProviderKind,
        profile: &ProviderProfile,
        features: &RequestFeatures,
    ) -> ScoreBreakdown {
        let complexity_factor =
            if profile.excels_on_complex && features.complexity_score > HARD_TASK_THRESHOLD {
                1.1
            } else {
                features.complexity_score.mul_add(-0.2, 1.0)
            };
        let capability = profile.capability(features.task_category) * complexity_factor;

        let mut performance = profile.performance;
        if kind.is_local() && features.urgency_score > URGENT_THRESHOLD {
            performance *= 1.2;
        }

        let mut cost = profile.cost;
        if features.cost_sensitivity > COST_SENSITIVE_THRESHOLD {
            cost *= if kind.is_local() { 1.3 } else { 0.8 };
        }

        let mut quality = profile.quality;
        if profile.premium_quality && features.quality_requirements > QUALITY_CRITICAL_THRESHOLD {
            quality *= 1.1;
        }

        ScoreBreakdown {
            capability: capability.clamp(0.0, 1.0),
            performance: performance.clamp(0.0, 1.0),
            cost: cost.clamp(0.0, 1.0),
            quality: quality.clamp(0.0, 1.0),
            availability: profile.availability.clamp(0.0, 1.0),
            total: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::features::TaskCategory;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-6
    }

    fn features(complexity_score: f64) -> RequestFeatures {
        RequestFeatures {
            complexity_score,
            urgency_score: 0.6,
            cost_sensitivity: 0.7,
            quality_requirements: 0.5,
            task_category: TaskCategory::CodeGeneration,
            context_richness: 0.002,
        }
    }

    #[test]
    fn test_balanced_scores_for_builtin_table() {
        let scorer = ProviderScorer::default();
        let features = features(0.502_98);

        let local = scorer.score(ProviderKind::Local, &features, RoutingStrategy::Balanced);
        let openai = scorer.score(ProviderKind::OpenAi, &features, RoutingStrategy::Balanced);
        let anthropic = scorer.score(ProviderKind::Anthropic, &features, RoutingStrategy::Balanced);

        assert!(close(local.total, 0.857_381));
        assert!(close(openai.total, 0.821_109));
        assert!(close(anthropic.total, 0.782_366));
        assert!(close(openai.capability, 0.95 * 0.899_404));
    }

    #[test]
    fn test_hard_task_bonus_for_providers_that_excel() {
        let scorer = ProviderScorer::default();
        let hard = features(0.9);

        let openai = scorer.score(ProviderKind::OpenAi, &hard, RoutingStrategy::Balanced);
        let anthropic = scorer.score(ProviderKind::Anthropic, &hard, RoutingStrategy::Balanced);

        // 0.95 * 1.1 is clamped
        assert!(close(openai.capability, 1.0));
        assert!(close(anthropic.capability, 0.9 * 0.82));
    }

    #[test]
    fn test_urgency_boosts_only_local_performance() {
        let scorer = ProviderScorer::default();
        let urgent = RequestFeatures {
            urgency_score: 1.0,
            ..features(0.5)
        };

        let local = scorer.score(ProviderKind::Local, &urgent, RoutingStrategy::Balanced);
        let google = scorer.score(ProviderKind::Google, &urgent, RoutingStrategy::Balanced);
        assert!(close(local.performance, 1.0));
        assert!(close(google.performance, 0.9));
    }

    #[test]
    fn test_cost_sensitive_users_shift_cost_scores() {
        let scorer = ProviderScorer::default();
        let frugal = RequestFeatures {
            cost_sensitivity: 0.9,
            ..features(0.5)
        };

        let local = scorer.score(ProviderKind::Local, &frugal, RoutingStrategy::CostOptimized);
        let google = scorer.score(ProviderKind::Google, &frugal, RoutingStrategy::CostOptimized);
        assert!(close(local.cost, 1.0));
        assert!(close(google.cost, 0.64));
    }

    #[test]
    fn test_premium_quality_boost_is_clamped() {
        let scorer = ProviderScorer::default();
        let critical = RequestFeatures {
            quality_requirements: 1.0,
            ..features(0.5)
        };

        let anthropic = scorer.score(ProviderKind::Anthropic, &critical, RoutingStrategy::Balanced);
        let openai = scorer.score(ProviderKind::OpenAi, &critical, RoutingStrategy::Balanced);
        let google = scorer.score(ProviderKind::Google, &critical, RoutingStrategy::Balanced);
        assert!(close(anthropic.quality, 1.0));
        assert!(close(openai.quality, 0.99));
        assert!(close(google.quality, 0.8));
    }

    #[test]
    fn test_unprofiled_provider_is_neutral() {
        let scorer = ProviderScorer::new(ProfileTable::empty());
        for strategy in RoutingStrategy::ALL {
            let breakdown = scorer.score(ProviderKind::Google, &features(0.5), strategy);
            assert!(close(breakdown.total, NEUTRAL_SCORE));
        }
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let scorer = ProviderScorer::default();
        let extreme = RequestFeatures {
            complexity_score: 1.0,
            urgency_score: 1.0,
            cost_sensitivity: 0.9,
            quality_requirements: 1.0,
            task_category: TaskCategory::CodeGeneration,
            context_richness: 1.0,
        };
        for kind in ProviderKind::ALL {
            for strategy in RoutingStrategy::ALL {
                let total = scorer.score(kind, &extreme, strategy).total;
                assert!((0.0..=1.0).contains(&total), "{kind} {strategy} scored {total}");
            }
        }
    }
}
