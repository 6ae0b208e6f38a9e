use super::features::TaskCategory;
use nexus_core::{Complexity, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score used for any dimension a profile does not cover.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Static reference data describing one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Fit per task category; missing categories score [`NEUTRAL_SCORE`].
    pub capabilities: HashMap<TaskCategory, f64>,
    /// Baseline speed score.
    pub performance: f64,
    /// Baseline cheapness score (higher is cheaper).
    pub cost: f64,
    /// Baseline output quality.
    pub quality: f64,
    /// Expected uptime.
    pub availability: f64,
    /// Average USD per moderate request.
    pub base_cost: f64,
    /// Average seconds per moderate request.
    pub base_time: f64,
    /// Gets a capability bonus instead of a penalty on hard requests.
    pub excels_on_complex: bool,
    /// Gets a quality bonus when quality requirements are high.
    pub premium_quality: bool,
}

impl ProviderProfile {
    /// A profile with the same capability for every category.
    pub fn uniform(capability: f64) -> Self {
        Self {
            capabilities: TaskCategory::MATCH_ORDER
                .into_iter()
                .map(|category| (category, capability))
                .collect(),
            performance: NEUTRAL_SCORE,
            cost: NEUTRAL_SCORE,
            quality: NEUTRAL_SCORE,
            availability: NEUTRAL_SCORE,
            base_cost: 0.01,
            base_time: 3.0,
            excels_on_complex: false,
            premium_quality: false,
        }
    }

    /// Sets the cost score.
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the performance score.
    #[must_use]
    pub fn with_performance(mut self, performance: f64) -> Self {
        self.performance = performance;
        self
    }

    /// Sets the quality score.
    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the availability score.
    #[must_use]
    pub fn with_availability(mut self, availability: f64) -> Self {
        self.availability = availability;
        self
    }

    /// Capability for `category`.
    pub fn capability(&self, category: TaskCategory) -> f64 {
        self.capabilities
            .get(&category)
            .copied()
            .unwrap_or(NEUTRAL_SCORE)
    }

    /// Estimated USD cost of a request at `complexity`.
    pub fn estimated_cost(&self, complexity: Complexity) -> f64 {
        let multiplier = match complexity {
            Complexity::Simple => 0.5,
            Complexity::Moderate => 1.0,
            Complexity::Complex => 2.0,
            Complexity::Enterprise => 3.0,
        };
        self.base_cost * multiplier
    }

    /// Estimated seconds for a request at `complexity`.
    pub fn estimated_time(&self, complexity: Complexity) -> f64 {
        let multiplier = match complexity {
            Complexity::Simple => 0.5,
            Complexity::Moderate => 1.0,
            Complexity::Complex => 1.5,
            Complexity::Enterprise => 2.0,
        };
        self.base_time * multiplier
    }

    fn with_capabilities(mut self, scores: [f64; 7]) -> Self {
        self.capabilities = TaskCategory::MATCH_ORDER.into_iter().zip(scores).collect();
        self
    }
}

/// Profiles indexed by provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTable {
    profiles: HashMap<ProviderKind, ProviderProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// A table with no profiles; every provider scores neutrally.
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// The reference profiles for the four known providers.
    pub fn builtin() -> Self {
        let openai = ProviderProfile {
            performance: 0.85,
            cost: 0.6,
            quality: 0.9,
            availability: 0.95,
            base_cost: 0.02,
            base_time: 3.0,
            excels_on_complex: true,
            premium_quality: true,
            ..ProviderProfile::uniform(NEUTRAL_SCORE)
        }
        .with_capabilities([0.95, 0.9, 0.85, 0.9, 0.9, 0.9, 0.85]);

        let anthropic = ProviderProfile {
            performance: 0.8,
            cost: 0.5,
            quality: 0.95,
            availability: 0.9,
            base_cost: 0.03,
            base_time: 4.0,
            excels_on_complex: false,
            premium_quality: true,
            ..ProviderProfile::uniform(NEUTRAL_SCORE)
        }
        .with_capabilities([0.9, 0.95, 0.9, 0.95, 0.85, 0.95, 0.9]);

        let google = ProviderProfile {
            performance: 0.9,
            cost: 0.8,
            quality: 0.8,
            availability: 0.85,
            base_cost: 0.01,
            base_time: 2.5,
            excels_on_complex: false,
            premium_quality: false,
            ..ProviderProfile::uniform(NEUTRAL_SCORE)
        }
        .with_capabilities([0.85, 0.8, 0.8, 0.85, 0.75, 0.8, 0.8]);

        let local = ProviderProfile {
            performance: 0.95,
            cost: 1.0,
            quality: 0.7,
            availability: 1.0,
            base_cost: 0.0,
            base_time: 1.0,
            excels_on_complex: false,
            premium_quality: false,
            ..ProviderProfile::uniform(NEUTRAL_SCORE)
        }
        .with_capabilities([0.8, 0.75, 0.7, 0.75, 0.65, 0.7, 0.7]);

        Self::empty()
            .with_profile(ProviderKind::OpenAi, openai)
            .with_profile(ProviderKind::Anthropic, anthropic)
            .with_profile(ProviderKind::Google, google)
            .with_profile(ProviderKind::Local, local)
    }

    /// Adds or replaces the profile for `kind`.
    #[must_use]
    pub fn with_profile(mut self, kind: ProviderKind, profile: ProviderProfile) -> Self {
        self.profiles.insert(kind, profile);
        self
    }

    /// Profile for `kind`, if one is registered.
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderProfile> {
        self.profiles.get(&kind)
    }
}
