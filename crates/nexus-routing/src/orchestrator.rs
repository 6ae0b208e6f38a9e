use std::collections::{BTreeMap, BTreeSet};
use std::iter::once;
use std::sync::Arc;

use nexus_core::{
    Clock, CompletionProvider, PerformanceMetrics, ProviderKind, Request, RequestFields, Response,
    ResponseFields, SystemClock,
};
use nexus_providers::LocalProvider;
use serde_json::{Value, from_value, to_value};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval};
use tracing::{debug, error, info, warn};

use crate::{
    CacheStats, FailedAttempt, FeatureExtractor, HistoryEntry, MetricsCollector,
    OrchestratorConfig, ProfileTable, ProviderRouter, ProviderScorer, ProviderStats, RateLimiter,
    ResponseCache, ResponseStore, ResponseValidator, Result, RoutingError, RoutingStrategy,
    ScoringRouter, ValidationPipeline,
};

/// Whether a dispatch goes through the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    Required,
    Skipped,
}

/// Top-level control loop tying cache, router, rate limiter, and providers together.
///
/// Every collaborator is owned by the instance, so independent orchestrators
/// never share state.
#[derive(Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    providers: BTreeMap<ProviderKind, Arc<dyn CompletionProvider>>,
    router: Arc<dyn ProviderRouter>,
    cache: Arc<dyn ResponseStore>,
    limiter: Arc<RateLimiter>,
    validator: Arc<dyn ResponseValidator>,
    metrics: Arc<MetricsCollector>,
    clock: Arc<dyn Clock>,
    last_resort: Arc<dyn CompletionProvider>,
}

impl Orchestrator {
    /// Creates an orchestrator with no registered providers, reading time from the system clock.
    ///
    /// A built-in [`LocalProvider`] still answers as last resort once registered
    /// providers are exhausted.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an orchestrator whose cache expiry and queue-wait logic read `clock`.
    pub fn with_clock(config: OrchestratorConfig, clock: Arc<dyn Clock>) -> Self {
        let router = Self::scoring_router(&config, ProfileTable::builtin(), &clock);
        let cache = Arc::new(ResponseCache::with_clock(
            config.cache.clone(),
            Arc::clone(&clock),
        ));
        let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));

        Self {
            config,
            providers: BTreeMap::new(),
            router,
            cache,
            limiter,
            validator: Arc::new(ValidationPipeline::with_default_stages()),
            metrics: Arc::new(MetricsCollector::new()),
            clock,
            last_resort: Arc::new(LocalProvider::new()),
        }
    }

    /// Creates an orchestrator with the local provider registered as a ranked candidate.
    pub fn with_local_fallback(config: OrchestratorConfig) -> Self {
        Self::new(config).with_provider(Arc::new(LocalProvider::new()))
    }

    fn scoring_router(
        config: &OrchestratorConfig,
        profiles: ProfileTable,
        clock: &Arc<dyn Clock>,
    ) -> Arc<dyn ProviderRouter> {
        Arc::new(ScoringRouter::new(
            ProviderScorer::new(profiles),
            FeatureExtractor::new(config.user_tiers.clone(), Arc::clone(clock)),
            Arc::clone(clock),
        ))
    }

    /// Registers `provider`, replacing any provider of the same kind.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Scores providers against `profiles` instead of the built-in table.
    #[must_use]
    pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
        self.router = Self::scoring_router(&self.config, profiles, &self.clock);
        self
    }

    /// Replaces the built-in provider dispatched once every candidate has failed.
    #[must_use]
    pub fn with_last_resort(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.last_resort = provider;
        self
    }

    /// Sets a custom router.
    #[must_use]
    pub fn with_router(mut self, router: Arc<dyn ProviderRouter>) -> Self {
        self.router = router;
        self
    }

    /// Sets a custom response store.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseStore>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets a custom validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ResponseValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Sets the routing strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Registered providers, in declaration order.
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    /// Serves `request` from cache or the best available provider, falling back on failure.
    ///
    /// # Errors
    /// Returns [`RoutingError::Configuration`] when no providers are registered or the
    /// request is invalid. [`RoutingError::AllProvidersFailed`] is only possible when a
    /// replacement installed with [`Self::with_last_resort`] fails as well.
    pub async fn process(&self, request: &Request) -> Result<Response> {
        if self.providers.is_empty() {
            return Err(RoutingError::Configuration(
                "no providers registered".to_owned(),
            ));
        }
        request
            .validate()
            .map_err(|error| RoutingError::Configuration(error.to_string()))?;

        if let Some(hit) = self.cached(request) {
            return Ok(hit);
        }

        let decision = self
            .router
            .rank(request, &self.provider_kinds(), self.config.strategy)?;

        let mut attempts = Vec::new();
        let mut tried = BTreeSet::new();
        for kind in decision.ranked_providers() {
            if !tried.insert(kind) {
                continue;
            }
            let Some(provider) = self.providers.get(&kind) else {
                let missing =
                    RoutingError::Configuration(format!("provider {kind} is not registered"));
                attempts.push(Self::note_failure(request, kind, &missing));
                continue;
            };
            match self
                .dispatch(provider.as_ref(), request, Validation::Required)
                .await
            {
                Ok(response) => return Ok(self.complete(request, response, &attempts)),
                Err(failure) => attempts.push(Self::note_failure(request, kind, &failure)),
            }
        }

        for provider in self.last_resorts(&tried) {
            warn!(
                request_id = %request.id,
                "Ranked providers exhausted, falling back to local processing"
            );
            match self
                .dispatch(provider.as_ref(), request, Validation::Skipped)
                .await
            {
                Ok(response) => return Ok(self.complete(request, response, &attempts)),
                Err(failure) => {
                    attempts.push(Self::note_failure(request, provider.kind(), &failure));
                }
            }
        }

        error!(
            request_id = %request.id,
            "All {} provider attempt(s) failed",
            attempts.len()
        );
        Err(RoutingError::AllProvidersFailed { attempts })
    }

    /// Flat-field entry point: a JSON object with at least `prompt` in, response fields out.
    ///
    /// # Errors
    /// Returns [`RoutingError::Configuration`] for malformed or incomplete fields, otherwise
    /// whatever [`Self::process`] returns.
    pub async fn process_fields(&self, fields: Value) -> Result<Value> {
        let fields: RequestFields = from_value(fields).map_err(|error| {
            RoutingError::Configuration(format!("malformed request fields: {error}"))
        })?;
        let request = Request::try_from(fields)
            .map_err(|error| RoutingError::Configuration(error.to_string()))?;

        let response = self.process(&request).await?;
        Ok(to_value(ResponseFields::from(response))?)
    }

    fn cached(&self, request: &Request) -> Option<Response> {
        let started = Instant::now();
        match self.cache.lookup(request) {
            Ok(Some(hit)) => {
                info!(request_id = %request.id, provider = %hit.provider, "Cache hit");
                Some(hit.as_cache_hit(request.id.clone(), started.elapsed().as_secs_f64()))
            }
            Ok(None) => {
                debug!(request_id = %request.id, "Cache miss");
                None
            }
            Err(failure) => {
                warn!(request_id = %request.id, "Cache lookup failed, treating as miss: {failure}");
                None
            }
        }
    }

    /// Registered local provider if the ranked walk skipped it, then the built-in one.
    fn last_resorts(&self, tried: &BTreeSet<ProviderKind>) -> Vec<Arc<dyn CompletionProvider>> {
        self.providers
            .get(&ProviderKind::Local)
            .filter(|_| !tried.contains(&ProviderKind::Local))
            .into_iter()
            .chain(once(&self.last_resort))
            .map(Arc::clone)
            .collect()
    }

    async fn dispatch(
        &self,
        provider: &dyn CompletionProvider,
        request: &Request,
        validation: Validation,
    ) -> Result<Response> {
        let kind = provider.kind();
        let held = self.limiter.admit(kind).await;
        if !held.is_zero() {
            debug!(provider = %kind, "Held {:.2}s by rate limiter", held.as_secs_f64());
        }

        let started = Instant::now();
        let outcome = match provider.process_request(request).await {
            Ok(response) if validation == Validation::Required => {
                self.validator.validate(response, request).await
            }
            Ok(response) => Ok(response),
            Err(failure) => Err(RoutingError::from(failure)),
        };
        let latency = started.elapsed().as_secs_f64();

        match &outcome {
            Ok(response) => self.metrics.record_success(kind, latency, response.cost),
            Err(_) => self.metrics.record_failure(kind, latency),
        }
        outcome
    }

    fn note_failure(
        request: &Request,
        kind: ProviderKind,
        failure: &RoutingError,
    ) -> FailedAttempt {
        warn!(request_id = %request.id, provider = %kind, "Provider attempt failed: {failure}");
        FailedAttempt {
            provider: kind,
            reason: failure.to_string(),
        }
    }

    fn complete(
        &self,
        request: &Request,
        response: Response,
        attempts: &[FailedAttempt],
    ) -> Response {
        let degraded = !attempts.is_empty() && response.provider.is_local();
        if degraded {
            warn!(
                request_id = %request.id,
                "Serving degraded local response after {} failure(s)",
                attempts.len()
            );
        } else if let Err(failure) = self.cache.store(request, &response) {
            warn!(request_id = %request.id, "Cache store failed: {failure}");
        }

        info!(
            request_id = %request.id,
            "Processed request with {} in {:.3}s",
            response.provider,
            response.processing_time
        );

        if attempts.is_empty() {
            return response;
        }

        let failed: Vec<Value> = attempts
            .iter()
            .map(|attempt| Value::String(attempt.provider.as_str().to_owned()))
            .collect();
        let annotated = response
            .with_metadata("fallback", Value::Bool(true))
            .with_metadata("failed_providers", Value::Array(failed));
        if degraded {
            annotated.with_metadata("degraded", Value::Bool(true))
        } else {
            annotated
        }
    }

    /// Asks every registered provider whether it is ready.
    pub async fn provider_health(&self) -> BTreeMap<ProviderKind, bool> {
        let mut health = BTreeMap::new();
        for (kind, provider) in &self.providers {
            health.insert(*kind, provider.check_availability().await);
        }
        health
    }

    /// Dispatch tallies recorded by this orchestrator.
    pub fn provider_metrics(&self) -> BTreeMap<ProviderKind, ProviderStats> {
        self.metrics.snapshot()
    }

    /// Performance figures each registered provider reports about itself.
    pub fn reported_metrics(&self) -> BTreeMap<ProviderKind, PerformanceMetrics> {
        self.providers
            .iter()
            .map(|(kind, provider)| (*kind, provider.performance_metrics()))
            .collect()
    }

    /// Recent routing decisions, oldest first.
    pub fn routing_history(&self) -> Vec<HistoryEntry> {
        self.router.history()
    }

    /// Cache entry count and hit/miss tallies.
    ///
    /// # Errors
    /// Returns [`RoutingError::Cache`] if the store cannot be read.
    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.stats()
    }

    /// Spawns the periodic cache sweep and rate-window pruning task.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_maintenance(&self) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let limiter = Arc::clone(&self.limiter);
        let period = self.config.cache.sweep_interval();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                match cache.sweep() {
                    Ok(0) => {}
                    Ok(removed) => info!("Maintenance swept {removed} expired cache entries"),
                    Err(failure) => warn!("Cache sweep failed: {failure}"),
                }
                limiter.prune().await;
            }
        })
    }
}
