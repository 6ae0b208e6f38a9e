//! Request feature derivation.
//!
//! Every score the router computes is a function of these features plus the
//! static provider profiles, so they are derived once per request.

use crate::config::UserTierConfig;
use nexus_core::{Clock, Complexity, Request};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Longest wait, in seconds, before the urgency boost saturates.
const WAIT_SATURATION_SECONDS: f64 = 300.0;
/// Largest urgency boost from queue wait.
const MAX_WAIT_BOOST: f64 = 0.3;
/// Prompt length that maxes out its complexity contribution.
const PROMPT_LENGTH_SCALE: f64 = 2000.0;
/// Context length that maxes out its complexity contribution.
const CONTEXT_LENGTH_SCALE: f64 = 5000.0;
/// Context length that counts as fully rich.
const CONTEXT_RICHNESS_SCALE: f64 = 1000.0;
/// Weight of the combined length adjustment.
const LENGTH_ADJUSTMENT_WEIGHT: f64 = 0.2;
/// Task types that demand extra quality.
const HIGH_STAKES_TASKS: [&str; 3] = ["code_review", "security_analysis", "architecture_design"];

/// Routing category a request falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Writing new code.
    CodeGeneration,
    /// Reviewing existing code.
    CodeReview,
    /// Finding and fixing defects.
    Debugging,
    /// Investigation and research.
    Analysis,
    /// Creative and design work.
    Creative,
    /// Dialogue and explanation.
    Conversation,
    /// Documentation and guides.
    TechnicalWriting,
    /// Anything else.
    General,
}

impl TaskCategory {
    /// Categories in match order. `General` is the fallback and has no keywords.
    pub const MATCH_ORDER: [Self; 7] = [
        Self::CodeGeneration,
        Self::CodeReview,
        Self::Debugging,
        Self::Analysis,
        Self::Creative,
        Self::Conversation,
        Self::TechnicalWriting,
    ];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeGeneration => "code_generation",
            Self::CodeReview => "code_review",
            Self::Debugging => "debugging",
            Self::Analysis => "analysis",
            Self::Creative => "creative",
            Self::Conversation => "conversation",
            Self::TechnicalWriting => "technical_writing",
            Self::General => "general",
        }
    }

    /// Phrases that put a request into this category. The first entry is the category name.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::CodeGeneration => &[
                "code_generation",
                "generate code",
                "write function",
                "create class",
                "implement",
            ],
            Self::CodeReview => &[
                "code_review",
                "review code",
                "check code",
                "analyze code",
                "code quality",
            ],
            Self::Debugging => &["debugging", "debug", "fix bug", "error", "troubleshoot"],
            Self::Analysis => &["analysis", "analyze", "examine", "investigate", "research"],
            Self::Creative => &["creative", "design", "write story", "brainstorm"],
            Self::Conversation => &["conversation", "chat", "discuss", "explain", "help"],
            Self::TechnicalWriting => &[
                "technical_writing",
                "documentation",
                "write guide",
                "create manual",
            ],
            Self::General => &[],
        }
    }

    /// First category whose keywords appear in the prompt or the task type.
    pub fn classify(prompt: &str, task_type: &str) -> Self {
        let prompt = prompt.to_lowercase();
        let task_type = task_type.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| {
                category
                    .keywords()
                    .iter()
                    .any(|keyword| prompt.contains(keyword) || task_type.contains(keyword))
            })
            .unwrap_or(Self::General)
    }
}

impl Display for TaskCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

/// Billing tier of a requesting user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    /// Free accounts.
    Free,
    /// Paid entry tier.
    #[default]
    Basic,
    /// Paid upper tier.
    Premium,
    /// Contracted customers.
    Enterprise,
}

impl UserTier {
    /// How strongly this tier prefers cheap providers.
    pub const fn cost_sensitivity(self) -> f64 {
        match self {
            Self::Free => 0.9,
            Self::Basic => 0.7,
            Self::Premium => 0.4,
            Self::Enterprise => 0.1,
        }
    }
}

/// Routing-relevant features derived from one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestFeatures {
    /// Declared complexity adjusted by prompt and context length, in `[0, 1]`.
    pub complexity_score: f64,
    /// Priority plus queue-wait boost, in `[0, 1]`.
    pub urgency_score: f64,
    /// Preference for cheap providers, from the user's tier.
    pub cost_sensitivity: f64,
    /// How much output quality matters, in `[0, 1]`.
    pub quality_requirements: f64,
    /// Matched task category.
    pub task_category: TaskCategory,
    /// Normalized serialized-context length, in `[0, 1]`.
    pub context_richness: f64,
}

const fn complexity_base(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 0.2,
        Complexity::Moderate => 0.5,
        Complexity::Complex => 0.8,
        Complexity::Enterprise => 1.0,
    }
}

const fn quality_base(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 0.3,
        Complexity::Moderate => 0.5,
        Complexity::Complex => 0.8,
        Complexity::Enterprise => 1.0,
    }
}

/// Derives [`RequestFeatures`] from requests.
#[derive(Clone)]
pub struct FeatureExtractor {
    tiers: UserTierConfig,
    clock: Arc<dyn Clock>,
}

impl FeatureExtractor {
    /// Creates an extractor resolving user tiers from `tiers` and wait times from `clock`.
    pub fn new(tiers: UserTierConfig, clock: Arc<dyn Clock>) -> Self {
        Self { tiers, clock }
    }

    /// Computes every feature for `request`.
    pub fn extract(&self, request: &Request) -> RequestFeatures {
        let context_length = request.context_json().chars().count() as f64;

        RequestFeatures {
            complexity_score: Self::complexity_score(request, context_length),
            urgency_score: self.urgency_score(request),
            cost_sensitivity: self.tiers.tier_for(&request.user_id).cost_sensitivity(),
            quality_requirements: Self::quality_requirements(request),
            task_category: TaskCategory::classify(&request.prompt, &request.task_type),
            context_richness: (context_length / CONTEXT_RICHNESS_SCALE).min(1.0),
        }
    }

    fn complexity_score(request: &Request, context_length: f64) -> f64 {
        let prompt_factor = (request.prompt.chars().count() as f64 / PROMPT_LENGTH_SCALE).min(1.0);
        let context_factor = (context_length / CONTEXT_LENGTH_SCALE).min(1.0);
        (prompt_factor + context_factor)
            .mul_add(LENGTH_ADJUSTMENT_WEIGHT, complexity_base(request.complexity))
            .min(1.0)
    }

    fn urgency_score(&self, request: &Request) -> f64 {
        let priority_factor = f64::from(request.priority) / 5.0;
        let wait_boost = request.queued_at.map_or(0.0, |queued_at| {
            let waited = (self.clock.now() - queued_at).num_milliseconds().max(0) as f64 / 1000.0;
            (waited / WAIT_SATURATION_SECONDS).min(MAX_WAIT_BOOST)
        });
        (priority_factor + wait_boost).min(1.0)
    }

    fn quality_requirements(request: &Request) -> f64 {
        let base = quality_base(request.complexity);
        let task_type = request.task_type.to_lowercase();
        if HIGH_STAKES_TASKS
            .iter()
            .any(|task| task_type.contains(task))
        {
            (base + 0.3).min(1.0)
        } else {
            base
        }
    }
}
