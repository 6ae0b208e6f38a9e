use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

/// Free-form JSON object used for request context and response provenance.
pub type Metadata = Map<String, Value>;

/// Lowest accepted request priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest accepted request priority.
pub const MAX_PRIORITY: u8 = 5;

/// Identity of a completion provider.
///
/// Declaration order is significant: it is the tie-break order when two
/// providers score identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// `OpenAI` chat completions.
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Claude.
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Google Gemini.
    #[serde(rename = "google")]
    Google,
    /// The always-available local fallback provider.
    #[serde(rename = "nexus_local")]
    Local,
}

impl ProviderKind {
    /// Every provider, in declaration order.
    pub const ALL: [Self; 4] = [Self::OpenAi, Self::Anthropic, Self::Google, Self::Local];

    /// Wire name used in configuration and serialized responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Local => "nexus_local",
        }
    }

    /// Whether this is the local fallback provider.
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Human-readable justification used when this provider wins routing.
    pub const fn selection_rationale(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI selected for strong general capabilities and code generation",
            Self::Anthropic => "Claude selected for superior reasoning and analysis quality",
            Self::Google => "Google AI selected for cost-effectiveness and good performance",
            Self::Local => "Local processing selected for speed, cost savings, and privacy",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| Error::InvalidRequest(format!("unknown provider: {value}")))
    }
}

/// How demanding a request is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Short factual or conversational requests.
    Simple,
    /// Everyday tasks.
    #[default]
    Moderate,
    /// Multi-step or deep reasoning tasks.
    Complex,
    /// Large, high-stakes work.
    Enterprise,
}

impl Complexity {
    /// Wire name of this complexity level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Enterprise => "enterprise",
        }
    }
}

impl Display for Complexity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(Error::InvalidRequest(format!("unknown complexity: {other}"))),
        }
    }
}

/// A task submitted for completion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique per submission.
    pub id: String,
    /// Natural-language task text.
    pub prompt: String,
    /// Free-text category used by routing heuristics.
    pub task_type: String,
    /// Declared difficulty.
    pub complexity: Complexity,
    /// Arbitrary side-channel data.
    pub context: Metadata,
    /// Requesting user.
    pub user_id: String,
    /// 1 through 5, 5 highest.
    pub priority: u8,
    /// Generation length hint.
    pub max_tokens: Option<u32>,
    /// Sampling temperature hint.
    pub temperature: Option<f32>,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
    /// When the request entered a queue, if it waited in one.
    pub queued_at: Option<DateTime<Utc>>,
}

impl Request {
    /// Creates a request with a fresh id and the default routing hints.
    pub fn new<T: Into<String>>(prompt: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            task_type: "general".to_owned(),
            complexity: Complexity::default(),
            context: Metadata::new(),
            user_id: "anonymous".to_owned(),
            priority: 3,
            max_tokens: None,
            temperature: None,
            timestamp: Utc::now(),
            queued_at: None,
        }
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the task type.
    #[must_use]
    pub fn with_task_type<T: Into<String>>(mut self, task_type: T) -> Self {
        self.task_type = task_type.into();
        self
    }

    /// Sets the complexity.
    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the requesting user.
    #[must_use]
    pub fn with_user<T: Into<String>>(mut self, user_id: T) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Adds one context entry.
    #[must_use]
    pub fn with_context_entry<T: Into<String>>(mut self, key: T, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Sets the submission time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Marks the request as having waited in a queue since `queued_at`.
    #[must_use]
    pub fn queued_since(mut self, queued_at: DateTime<Utc>) -> Self {
        self.queued_at = Some(queued_at);
        self
    }

    /// Serialized form of the context, as used for length-based heuristics.
    pub fn context_json(&self) -> String {
        Value::Object(self.context.clone()).to_string()
    }

    /// Checks the fields every component relies on.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] for an empty prompt or a priority outside 1..=5.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("prompt is required".to_owned()));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(Error::InvalidRequest(format!(
                "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {}",
                self.priority
            )));
        }
        Ok(())
    }
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echoes the originating request id.
    pub id: String,
    /// Provider that produced the content.
    pub provider: ProviderKind,
    /// Generated text.
    pub content: String,
    /// Heuristic quality estimate in `[0, 1]`.
    pub confidence: f64,
    /// Seconds spent producing this response.
    pub processing_time: f64,
    /// Estimated monetary cost in USD.
    pub cost: f64,
    /// Provenance: model name, token usage, stop reason, routing annotations.
    pub metadata: Metadata,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl Response {
    /// Returns a copy carrying one more metadata entry.
    #[must_use]
    pub fn with_metadata<T: Into<String>>(mut self, key: T, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the copy handed out for a cache hit.
    ///
    /// The id echoes the request being served and `processing_time` reflects
    /// the lookup rather than the original generation.
    #[must_use]
    pub fn as_cache_hit<T: Into<String>>(mut self, request_id: T, lookup_seconds: f64) -> Self {
        self.id = request_id.into();
        self.processing_time = lookup_seconds;
        self.with_metadata("cache_hit", Value::Bool(true))
    }

    /// Whether this response came from the local fallback after preferred providers failed.
    pub fn is_degraded(&self) -> bool {
        self.metadata
            .get("degraded")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string};

    fn sample_response() -> Response {
        Response {
            id: "req-1".to_owned(),
            provider: ProviderKind::Google,
            content: "done".to_owned(),
            confidence: 0.8,
            processing_time: 1.5,
            cost: 0.01,
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_complexity_ordering() {
        assert!(Complexity::Simple < Complexity::Moderate);
        assert!(Complexity::Moderate < Complexity::Complex);
        assert!(Complexity::Complex < Complexity::Enterprise);
        assert_eq!(Complexity::default(), Complexity::Moderate);
    }

    #[test]
    fn test_complexity_parsing() -> Result<()> {
        assert_eq!("Enterprise".parse::<Complexity>()?, Complexity::Enterprise);
        assert_eq!(" simple ".parse::<Complexity>()?, Complexity::Simple);
        assert!("huge".parse::<Complexity>().is_err());
        Ok(())
    }

    #[test]
    fn test_provider_wire_names() -> anyhow::Result<()> {
        assert_eq!(to_string(&ProviderKind::OpenAi)?, "\"openai\"");
        assert_eq!(to_string(&ProviderKind::Local)?, "\"nexus_local\"");
        assert_eq!(from_str::<ProviderKind>("\"google\"")?, ProviderKind::Google);
        assert_eq!("ANTHROPIC".parse::<ProviderKind>()?, ProviderKind::Anthropic);
        assert!("whiskey_local".parse::<ProviderKind>().is_err());
        Ok(())
    }

    #[test]
    fn test_provider_declaration_order() {
        let mut shuffled = vec![
            ProviderKind::Local,
            ProviderKind::Google,
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
        ];
        shuffled.sort();
        assert_eq!(shuffled, ProviderKind::ALL.to_vec());
        assert!(ProviderKind::Local.is_local());
        assert!(!ProviderKind::OpenAi.is_local());
    }

    #[test]
    fn test_request_validation() {
        let valid = Request::new("Explain lifetimes");
        assert!(valid.validate().is_ok());

        let blank = Request::new("   ");
        assert!(matches!(blank.validate(), Err(Error::InvalidRequest(_))));

        let too_urgent = Request::new("hurry").with_priority(6);
        assert!(matches!(too_urgent.validate(), Err(Error::InvalidRequest(_))));

        let zero = Request::new("idle").with_priority(0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_request_context_json() {
        let empty = Request::new("hi");
        assert_eq!(empty.context_json(), "{}");

        let framed = Request::new("hi").with_context_entry("framework", json!("React"));
        assert_eq!(framed.context_json(), r#"{"framework":"React"}"#);
    }

    #[test]
    fn test_cache_hit_copy_rewrites_identity_only() {
        let original = sample_response();
        let hit = original.clone().as_cache_hit("req-2", 0.0001);

        assert_eq!(hit.id, "req-2");
        assert_eq!(hit.content, original.content);
        assert_eq!(hit.provider, original.provider);
        assert!(hit.processing_time < 0.001);
        assert_eq!(hit.metadata.get("cache_hit"), Some(&Value::Bool(true)));
        assert!(original.metadata.is_empty());
    }

    #[test]
    fn test_degraded_flag() {
        let plain = sample_response();
        assert!(!plain.is_degraded());

        let degraded = plain.with_metadata("degraded", Value::Bool(true));
        assert!(degraded.is_degraded());
    }
}
