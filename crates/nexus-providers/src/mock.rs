//! Mock provider for exercising routing and fallback.
//!
//! Content comes from a pattern table, failures follow a script, and every
//! call is recorded so tests can assert how often a provider was dispatched.

use async_trait::async_trait;
use chrono::Utc;
use nexus_core::{
    CompletionProvider, Error, IgnoreLock as _, Metadata, PerformanceMetrics, ProviderKind,
    Request, Response, Result,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

/// When a mock provider should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call succeeds.
    Never,
    /// Every call fails.
    Always,
    /// The first `n` calls fail, later ones succeed.
    FirstN(usize),
}

impl FailureMode {
    const fn fails_on(self, call_index: usize) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::FirstN(count) => call_index < count,
        }
    }
}

/// Pattern → content table
type ResponseTable = Arc<Mutex<Vec<(String, String)>>>;

/// Success and failure tallies
#[derive(Debug, Default, Clone, Copy)]
struct Outcomes {
    successes: u64,
    failures: u64,
}

/// Provider that answers from a scripted table.
///
/// Clones share their call history, so a clone kept by a test observes calls
/// made through the copy handed to the orchestrator.
#[derive(Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    responses: ResponseTable,
    default_response: Arc<Mutex<Option<String>>>,
    failure_mode: FailureMode,
    confidence: f64,
    cost: f64,
    latency: Duration,
    available: Arc<AtomicBool>,
    call_history: Arc<Mutex<Vec<String>>>,
    outcomes: Arc<Mutex<Outcomes>>,
}

impl MockProvider {
    /// Creates a mock that impersonates `kind` and always succeeds.
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            responses: Arc::new(Mutex::new(Vec::new())),
            default_response: Arc::new(Mutex::new(None)),
            failure_mode: FailureMode::Never,
            confidence: 0.9,
            cost: 0.01,
            latency: Duration::ZERO,
            available: Arc::new(AtomicBool::new(true)),
            call_history: Arc::new(Mutex::new(Vec::new())),
            outcomes: Arc::new(Mutex::new(Outcomes::default())),
        }
    }

    /// Creates a mock that fails every call.
    #[must_use]
    pub fn failing(kind: ProviderKind) -> Self {
        Self::new(kind).with_failure_mode(FailureMode::Always)
    }

    /// Add a pattern-based response; the first pattern contained in the prompt wins.
    #[must_use]
    pub fn with_response(self, pattern: impl Into<String>, content: impl Into<String>) -> Self {
        self.responses
            .lock_ignore_poison()
            .push((pattern.into(), content.into()));
        self
    }

    /// Set the content returned when no pattern matches.
    #[must_use]
    pub fn with_default_response(self, content: impl Into<String>) -> Self {
        *self.default_response.lock_ignore_poison() = Some(content.into());
        self
    }

    /// Set the failure script.
    #[must_use]
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Set the confidence reported on successful responses.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the cost reported on successful responses.
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Change what `check_availability` reports.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Clear the call history.
    pub fn clear_history(&self) {
        self.call_history.lock_ignore_poison().clear();
    }

    /// Prompts of every call made, in order.
    #[must_use]
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }

    fn find_response(&self, prompt: &str) -> Option<String> {
        let responses = self.responses.lock_ignore_poison();
        responses
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, content)| content.clone())
    }

    fn record_outcome(&self, success: bool) {
        let mut outcomes = self.outcomes.lock_ignore_poison();
        if success {
            outcomes.successes += 1;
        } else {
            outcomes.failures += 1;
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn process_request(&self, request: &Request) -> Result<Response> {
        let call_index = {
            let mut history = self.call_history.lock_ignore_poison();
            history.push(request.prompt.clone());
            history.len() - 1
        };

        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        if self.failure_mode.fails_on(call_index) {
            self.record_outcome(false);
            return Err(Error::Provider(format!(
                "{} mock failure on call {}",
                self.kind,
                call_index + 1
            )));
        }

        let content = self.find_response(&request.prompt).unwrap_or_else(|| {
            self.default_response
                .lock_ignore_poison()
                .clone()
                .unwrap_or_else(|| format!("Mock {} response for: {}", self.kind, request.prompt))
        });

        let mut metadata = Metadata::new();
        metadata.insert("model".to_owned(), Value::String(format!("{}-mock", self.kind)));
        self.record_outcome(true);

        Ok(Response {
            id: request.id.clone(),
            provider: self.kind,
            content,
            confidence: self.confidence,
            processing_time: self.latency.as_secs_f64(),
            cost: self.cost,
            metadata,
            timestamp: Utc::now(),
        })
    }

    async fn check_availability(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn performance_metrics(&self) -> PerformanceMetrics {
        let outcomes = *self.outcomes.lock_ignore_poison();
        let total = outcomes.successes + outcomes.failures;
        if total == 0 {
            return PerformanceMetrics::default();
        }
        let (successes, total) = (outcomes.successes as f64, total as f64);
        PerformanceMetrics {
            avg_response_time: self.latency.as_secs_f64(),
            success_rate: successes / total,
            error_rate: 1.0 - successes / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_pattern_match() {
        let provider = MockProvider::new(ProviderKind::OpenAi)
            .with_response("fibonacci", "fn fib(n: u64) -> u64 { n }")
            .with_default_response("fallback text");

        let matched = provider
            .process_request(&Request::new("Generate a fibonacci function"))
            .await;
        assert!(matched.is_ok(), "Failed to generate response");
        if let Ok(response) = matched {
            assert_eq!(response.content, "fn fib(n: u64) -> u64 { n }");
            assert_eq!(response.provider, ProviderKind::OpenAi);
        }

        let unmatched = provider.process_request(&Request::new("Tell a joke")).await;
        if let Ok(response) = unmatched {
            assert_eq!(response.content, "fallback text");
        } else {
            panic!("default response expected");
        }
    }

    #[tokio::test]
    async fn test_mock_provider_first_n_failures() {
        let provider =
            MockProvider::new(ProviderKind::Google).with_failure_mode(FailureMode::FirstN(2));
        let request = Request::new("retry me");

        assert!(provider.process_request(&request).await.is_err());
        assert!(provider.process_request(&request).await.is_err());
        assert!(provider.process_request(&request).await.is_ok());
        assert_eq!(provider.call_count(), 3);

        let metrics = provider.performance_metrics();
        assert!((metrics.success_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!((metrics.error_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mock_provider_always_fails_with_provider_error() {
        let provider = MockProvider::failing(ProviderKind::Anthropic);
        let outcome = provider.process_request(&Request::new("x")).await;
        assert!(matches!(outcome, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_history_shared_between_clones() {
        let provider = MockProvider::new(ProviderKind::OpenAi);
        let handle = provider.clone();

        assert!(provider.process_request(&Request::new("first")).await.is_ok());
        assert!(provider.process_request(&Request::new("second")).await.is_ok());

        assert_eq!(handle.call_history(), vec!["first".to_owned(), "second".to_owned()]);
        handle.clear_history();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_availability_toggle() {
        let provider = MockProvider::new(ProviderKind::Google);
        assert!(provider.check_availability().await);
        provider.set_available(false);
        assert!(!provider.check_availability().await);
    }
}
