//! Request orchestration for the Nexus engine.
//!
//! An [`Orchestrator`] serves each request from the [`ResponseCache`] when it
//! can, otherwise asks a [`ProviderRouter`] to rank the registered providers,
//! admits the dispatch through the [`RateLimiter`], validates the response,
//! and walks down the ranking (ending with local processing) when a provider
//! fails.

/// Response caching
pub mod cache;
/// Orchestrator configuration
pub mod config;
/// Error types
pub mod error;
/// Per-provider rate limiting
pub mod limiter;
/// Dispatch metrics
pub mod metrics;
/// Control loop
pub mod orchestrator;
/// Provider ranking
pub mod router;
/// Response validation
pub mod validator;

pub use cache::{CacheStats, CachedResponse, ResponseCache, ResponseStore, fingerprint};
pub use config::{CacheConfig, OrchestratorConfig, RateLimitConfig, UserTierConfig};
pub use error::{FailedAttempt, Result, RoutingError};
pub use limiter::RateLimiter;
pub use metrics::{MetricsCollector, ProviderStats};
pub use orchestrator::Orchestrator;
pub use router::{
    FeatureExtractor, HistoryEntry, ProfileTable, ProviderProfile, ProviderRouter,
    ProviderScorer, RequestFeatures, RoutingDecision, RoutingHistory, RoutingStrategy,
    ScoreBreakdown, ScoringRouter, StrategyWeights, TaskCategory, UserTier,
};
pub use validator::{PassThroughValidator, ResponseValidator, ValidationPipeline, ValidationStage};
