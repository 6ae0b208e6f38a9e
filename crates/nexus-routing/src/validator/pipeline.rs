use super::ResponseValidator;
use crate::{Result, RoutingError};
use async_trait::async_trait;
use nexus_core::{Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Outcome of one validation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    /// Stage that produced this result
    pub stage: &'static str,
    /// Whether the response passed
    pub passed: bool,
    /// Explanation when the response failed
    pub details: String,
}

impl StageResult {
    fn pass(stage: &'static str) -> Self {
        Self {
            stage,
            passed: true,
            details: String::new(),
        }
    }

    fn fail(stage: &'static str, details: String) -> Self {
        Self {
            stage,
            passed: false,
            details,
        }
    }
}

/// Individual validation stage.
#[async_trait]
pub trait ValidationStage: Send + Sync {
    /// Checks `response` against `request`.
    async fn check(&self, response: &Response, request: &Request) -> StageResult;

    /// Stage name used in failure messages.
    fn name(&self) -> &'static str;
}

/// Rejects empty or whitespace-only content.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyContentStage;

#[async_trait]
impl ValidationStage for NonEmptyContentStage {
    async fn check(&self, response: &Response, _request: &Request) -> StageResult {
        if response.content.trim().is_empty() {
            StageResult::fail(self.name(), "response content is empty".to_owned())
        } else {
            StageResult::pass(self.name())
        }
    }

    fn name(&self) -> &'static str {
        "non_empty_content"
    }
}

/// Requires a finite confidence within `[0, 1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfidenceRangeStage;

#[async_trait]
impl ValidationStage for ConfidenceRangeStage {
    async fn check(&self, response: &Response, _request: &Request) -> StageResult {
        if (0.0..=1.0).contains(&response.confidence) {
            StageResult::pass(self.name())
        } else {
            StageResult::fail(
                self.name(),
                format!("confidence {} outside [0, 1]", response.confidence),
            )
        }
    }

    fn name(&self) -> &'static str {
        "confidence_range"
    }
}

/// Requires a finite, non-negative cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct CostRangeStage;

#[async_trait]
impl ValidationStage for CostRangeStage {
    async fn check(&self, response: &Response, _request: &Request) -> StageResult {
        if response.cost.is_finite() && response.cost >= 0.0 {
            StageResult::pass(self.name())
        } else {
            StageResult::fail(self.name(), format!("invalid cost {}", response.cost))
        }
    }

    fn name(&self) -> &'static str {
        "cost_range"
    }
}

/// Requires the response id to echo the request id.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdEchoStage;

#[async_trait]
impl ValidationStage for IdEchoStage {
    async fn check(&self, response: &Response, request: &Request) -> StageResult {
        if response.id == request.id {
            StageResult::pass(self.name())
        } else {
            StageResult::fail(
                self.name(),
                format!("response id {} does not match request {}", response.id, request.id),
            )
        }
    }

    fn name(&self) -> &'static str {
        "id_echo"
    }
}

/// Multi-stage validation pipeline
pub struct ValidationPipeline {
    /// Ordered collection of validation stages to execute
    stages: Vec<Arc<dyn ValidationStage>>,
    /// If true, stops running further stages after the first failure
    early_exit: bool,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::with_default_stages()
    }
}

impl ValidationPipeline {
    /// Creates a pipeline running `stages` in order.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn ValidationStage>>) -> Self {
        Self {
            stages,
            early_exit: true,
        }
    }

    /// Sets whether the pipeline stops at the first failing stage.
    #[must_use]
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    /// Content, confidence, cost, and id checks.
    #[must_use]
    pub fn with_default_stages() -> Self {
        let stages: Vec<Arc<dyn ValidationStage>> = vec![
            Arc::new(NonEmptyContentStage),
            Arc::new(ConfidenceRangeStage),
            Arc::new(CostRangeStage),
            Arc::new(IdEchoStage),
        ];

        Self::new(stages)
    }

    /// Runs the stages and returns every result produced.
    pub async fn run(&self, response: &Response, request: &Request) -> Vec<StageResult> {
        let mut results = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let result = stage.check(response, request).await;
            let passed = result.passed;
            results.push(result);

            if !passed && self.early_exit {
                break;
            }
        }
        results
    }
}

#[async_trait]
impl ResponseValidator for ValidationPipeline {
    async fn validate(&self, response: Response, request: &Request) -> Result<Response> {
        let failures: Vec<String> = self
            .run(&response, request)
            .await
            .into_iter()
            .filter(|result| !result.passed)
            .map(|result| format!("{}: {}", result.stage, result.details))
            .collect();

        if failures.is_empty() {
            Ok(response)
        } else {
            debug!(
                provider = %response.provider,
                "Response rejected by {} validation stage(s)",
                failures.len()
            );
            Err(RoutingError::Validation(failures.join("; ")))
        }
    }
}
