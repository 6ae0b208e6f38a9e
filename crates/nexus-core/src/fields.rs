//! Flat field mappings for the structured-in/structured-out entry point.
//!
//! Callers hand over a loose JSON object where only `prompt` is mandatory;
//! everything else falls back to routing defaults.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Complexity, Metadata, Request, Response};
use crate::{Error, Result};

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_task_type() -> String {
    "general".to_owned()
}

fn default_user() -> String {
    "anonymous".to_owned()
}

const fn default_priority() -> u8 {
    3
}

/// Incoming request fields with defaults applied for everything but `prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFields {
    /// Request id; a fresh UUID when absent.
    #[serde(default = "fresh_id")]
    pub id: String,
    /// Task text. Required.
    pub prompt: Option<String>,
    /// Routing category hint.
    #[serde(default = "default_task_type")]
    pub task_type: String,
    /// Declared difficulty.
    #[serde(default)]
    pub complexity: Complexity,
    /// Side-channel data.
    #[serde(default)]
    pub context: Metadata,
    /// Requesting user.
    #[serde(default = "default_user")]
    pub user_id: String,
    /// 1 through 5.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Generation length hint.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature hint.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Submission time; now when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Queue entry time, if the caller queued the request.
    #[serde(default)]
    pub queued_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestFields> for Request {
    type Error = Error;

    fn try_from(fields: RequestFields) -> Result<Self> {
        let prompt = fields
            .prompt
            .ok_or_else(|| Error::InvalidRequest("prompt is required".to_owned()))?;

        let request = Self {
            id: fields.id,
            prompt,
            task_type: fields.task_type,
            complexity: fields.complexity,
            context: fields.context,
            user_id: fields.user_id,
            priority: fields.priority,
            max_tokens: fields.max_tokens,
            temperature: fields.temperature,
            timestamp: fields.timestamp.unwrap_or_else(Utc::now),
            queued_at: fields.queued_at,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Outgoing response fields: the response entity with an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFields {
    /// Echo of the request id.
    pub id: String,
    /// Provider wire name.
    pub provider: String,
    /// Generated text.
    pub content: String,
    /// Quality estimate.
    pub confidence: f64,
    /// Seconds spent.
    pub processing_time: f64,
    /// Estimated cost in USD.
    pub cost: f64,
    /// Provenance.
    pub metadata: Metadata,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<Response> for ResponseFields {
    fn from(response: Response) -> Self {
        Self {
            id: response.id,
            provider: response.provider.as_str().to_owned(),
            content: response.content,
            confidence: response.confidence,
            processing_time: response.processing_time,
            cost: response.cost,
            metadata: response.metadata,
            timestamp: response
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderKind;
    use serde_json::{from_value, json};

    #[test]
    fn test_defaults_applied() -> anyhow::Result<()> {
        let fields: RequestFields = from_value(json!({ "prompt": "Summarise this" }))?;
        let request = Request::try_from(fields)?;

        assert_eq!(request.prompt, "Summarise this");
        assert_eq!(request.task_type, "general");
        assert_eq!(request.complexity, Complexity::Moderate);
        assert_eq!(request.priority, 3);
        assert!(request.context.is_empty());
        assert!(!request.id.is_empty());
        assert!(request.queued_at.is_none());
        Ok(())
    }

    #[test]
    fn test_explicit_fields_kept() -> anyhow::Result<()> {
        let fields: RequestFields = from_value(json!({
            "id": "example_001",
            "prompt": "Generate a React component for user authentication",
            "task_type": "code_generation",
            "complexity": "complex",
            "context": { "framework": "React" },
            "user_id": "user_123",
            "priority": 5
        }))?;
        let request = Request::try_from(fields)?;

        assert_eq!(request.id, "example_001");
        assert_eq!(request.complexity, Complexity::Complex);
        assert_eq!(request.priority, 5);
        assert_eq!(request.context.get("framework"), Some(&json!("React")));
        Ok(())
    }

    #[test]
    fn test_missing_prompt_rejected() -> anyhow::Result<()> {
        let fields: RequestFields = from_value(json!({ "task_type": "chat" }))?;
        let outcome = Request::try_from(fields);
        assert!(matches!(outcome, Err(Error::InvalidRequest(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_complexity_is_a_parse_error() {
        let outcome = from_value::<RequestFields>(json!({
            "prompt": "x",
            "complexity": "galactic"
        }));
        assert!(outcome.is_err());
    }

    #[test]
    fn test_response_fields_timestamp_is_iso8601() {
        let response = Response {
            id: "req".to_owned(),
            provider: ProviderKind::Local,
            content: "ok".to_owned(),
            confidence: 0.75,
            processing_time: 0.5,
            cost: 0.0,
            metadata: Metadata::new(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
        };
        let fields = ResponseFields::from(response);

        assert_eq!(fields.provider, "nexus_local");
        assert_eq!(fields.timestamp, "2023-11-14T22:13:20.000000Z");
    }
}
