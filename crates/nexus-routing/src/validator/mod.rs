/// Multi-stage response validation
pub mod pipeline;

use crate::Result;
use async_trait::async_trait;
use nexus_core::{Request, Response};

pub use pipeline::{
    ConfidenceRangeStage, CostRangeStage, IdEchoStage, NonEmptyContentStage, StageResult,
    ValidationPipeline, ValidationStage,
};

/// Quality gate applied to a provider response before it is accepted.
#[async_trait]
pub trait ResponseValidator: Send + Sync {
    /// Accepts `response` for `request`, possibly annotated, or rejects it.
    ///
    /// # Errors
    /// Returns [`RoutingError::Validation`](crate::RoutingError::Validation)
    /// when the response fails a check.
    async fn validate(&self, response: Response, request: &Request) -> Result<Response>;
}

/// Validator that accepts every response unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughValidator;

#[async_trait]
impl ResponseValidator for PassThroughValidator {
    async fn validate(&self, response: Response, _request: &Request) -> Result<Response> {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nexus_core::{Metadata, ProviderKind};

    #[tokio::test]
    async fn test_pass_through_accepts_anything() -> Result<()> {
        let request = Request::new("anything");
        let response = Response {
            id: "unrelated".to_owned(),
            provider: ProviderKind::OpenAi,
            content: String::new(),
            confidence: 7.0,
            processing_time: 0.0,
            cost: -1.0,
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        };
        let accepted = PassThroughValidator.validate(response.clone(), &request).await?;
        assert_eq!(accepted, response);
        Ok(())
    }
}
