use async_trait::async_trait;
use chrono::Utc;
use nexus_core::{
    CompletionProvider, Metadata, PerformanceMetrics, ProviderKind, Request, Response, Result,
};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Number of prompt characters echoed back in local responses.
const PROMPT_PREVIEW_CHARS: usize = 100;

/// Local processing provider used as the last-resort fallback.
///
/// Never fails and never costs anything; the content is a short canned
/// acknowledgement shaped by the task type.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    enhanced_capabilities: bool,
    simulated_latency: Duration,
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalProvider {
    /// Creates a local provider with enhanced capabilities and no artificial delay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enhanced_capabilities: true,
            simulated_latency: Duration::ZERO,
        }
    }

    /// Sets the flag reported under `enhanced_capabilities` in response metadata.
    #[must_use]
    pub fn with_enhanced_capabilities(mut self, enabled: bool) -> Self {
        self.enhanced_capabilities = enabled;
        self
    }

    /// Adds an artificial delay standing in for real processing.
    #[must_use]
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }

    fn render_content(request: &Request) -> String {
        let preview: String = request.prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        let task_type = request.task_type.to_lowercase();

        if task_type.contains("code") {
            format!("Local code generation for: {preview}...")
        } else if task_type.contains("analysis") {
            format!("Local analysis result for: {preview}...")
        } else {
            format!("Local processing completed for: {preview}...")
        }
    }
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn process_request(&self, request: &Request) -> Result<Response> {
        let start = Instant::now();
        if !self.simulated_latency.is_zero() {
            sleep(self.simulated_latency).await;
        }

        let content = Self::render_content(request);
        debug!(request_id = %request.id, "Local provider produced {} chars", content.len());

        let mut metadata = Metadata::new();
        metadata.insert("local_processing".to_owned(), Value::Bool(true));
        metadata.insert(
            "enhanced_capabilities".to_owned(),
            Value::Bool(self.enhanced_capabilities),
        );

        Ok(Response {
            id: request.id.clone(),
            provider: ProviderKind::Local,
            content,
            confidence: 0.75,
            processing_time: start.elapsed().as_secs_f64(),
            cost: 0.0,
            metadata,
            timestamp: Utc::now(),
        })
    }

    async fn check_availability(&self) -> bool {
        true
    }

    fn performance_metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics {
            avg_response_time: 0.5,
            success_rate: 1.0,
            error_rate: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(provider: &LocalProvider, request: &Request) -> Response {
        match provider.process_request(request).await {
            Ok(response) => response,
            Err(error) => panic!("local provider failed: {error}"),
        }
    }

    #[tokio::test]
    async fn test_content_follows_task_type() {
        let provider = LocalProvider::new();

        let code = Request::new("Write a parser").with_task_type("code_generation");
        assert_eq!(
            run(&provider, &code).await.content,
            "Local code generation for: Write a parser..."
        );

        let analysis = Request::new("Market trends").with_task_type("Data_Analysis");
        assert_eq!(
            run(&provider, &analysis).await.content,
            "Local analysis result for: Market trends..."
        );

        let general = Request::new("Say hi");
        assert_eq!(
            run(&provider, &general).await.content,
            "Local processing completed for: Say hi..."
        );
    }

    #[tokio::test]
    async fn test_prompt_preview_is_char_bounded() {
        let provider = LocalProvider::new();
        let prompt = "é".repeat(150);
        let response = run(&provider, &Request::new(prompt)).await;

        let preview = response
            .content
            .trim_start_matches("Local processing completed for: ")
            .trim_end_matches("...");
        assert_eq!(preview.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_response_shape() {
        let provider = LocalProvider::new().with_enhanced_capabilities(false);
        let request = Request::new("anything").with_id("req-local");
        let response = run(&provider, &request).await;

        assert_eq!(response.id, "req-local");
        assert_eq!(response.provider, ProviderKind::Local);
        assert!((response.confidence - 0.75).abs() < f64::EPSILON);
        assert!(response.cost.abs() < f64::EPSILON);
        assert_eq!(response.metadata.get("local_processing"), Some(&Value::Bool(true)));
        assert_eq!(
            response.metadata.get("enhanced_capabilities"),
            Some(&Value::Bool(false))
        );
        assert!(provider.check_availability().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency_is_reported() {
        let provider = LocalProvider::new().with_simulated_latency(Duration::from_millis(500));
        let response = run(&provider, &Request::new("slow")).await;
        assert!(response.processing_time >= 0.5);
    }
}
