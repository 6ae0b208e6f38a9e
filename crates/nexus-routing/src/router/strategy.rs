use crate::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Named weight vector selecting which scoring dimension dominates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Cheapest acceptable provider.
    CostOptimized,
    /// Fastest provider.
    PerformanceOptimized,
    /// Highest quality provider.
    QualityOptimized,
    /// Even blend of every dimension.
    #[default]
    Balanced,
    /// Most reliable provider.
    AvailabilityFirst,
}

/// Weights over the five scoring dimensions. Each vector sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    /// Task-category fit.
    pub capability: f64,
    /// Speed.
    pub performance: f64,
    /// Cheapness.
    pub cost: f64,
    /// Output quality.
    pub quality: f64,
    /// Expected uptime.
    pub availability: f64,
}

impl StrategyWeights {
    /// Sum of all five weights.
    pub fn total(&self) -> f64 {
        self.capability + self.performance + self.cost + self.quality + self.availability
    }
}

impl RoutingStrategy {
    /// Every strategy.
    pub const ALL: [Self; 5] = [
        Self::CostOptimized,
        Self::PerformanceOptimized,
        Self::QualityOptimized,
        Self::Balanced,
        Self::AvailabilityFirst,
    ];

    /// The weight vector for this strategy.
    pub const fn weights(self) -> StrategyWeights {
        let (capability, performance, cost, quality, availability) = match self {
            Self::CostOptimized => (0.15, 0.15, 0.50, 0.10, 0.10),
            Self::PerformanceOptimized => (0.20, 0.50, 0.10, 0.10, 0.10),
            Self::QualityOptimized => (0.30, 0.10, 0.10, 0.40, 0.10),
            Self::Balanced => (0.25, 0.25, 0.20, 0.20, 0.10),
            Self::AvailabilityFirst => (0.15, 0.15, 0.15, 0.15, 0.40),
        };
        StrategyWeights {
            capability,
            performance,
            cost,
            quality,
            availability,
        }
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CostOptimized => "cost_optimized",
            Self::PerformanceOptimized => "performance_optimized",
            Self::QualityOptimized => "quality_optimized",
            Self::Balanced => "balanced",
            Self::AvailabilityFirst => "availability_first",
        }
    }

    /// Clause added to routing reasoning, if this strategy has one.
    pub const fn reasoning_clause(self) -> Option<&'static str> {
        match self {
            Self::CostOptimized => Some("Cost optimization prioritized in selection"),
            Self::PerformanceOptimized => Some("Performance optimization prioritized in selection"),
            Self::QualityOptimized => Some("Quality optimization prioritized in selection"),
            Self::Balanced | Self::AvailabilityFirst => None,
        }
    }
}

impl Display for RoutingStrategy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RoutingStrategy {
    type Err = RoutingError;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| RoutingError::Configuration(format!("unknown routing strategy: {value}")))
    }
}
