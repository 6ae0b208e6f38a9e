//! Per-provider sliding-window admission control.
//!
//! Admission never fails; a caller over the limit is held until the oldest
//! call in the window ages out. Each provider's window sits behind a FIFO
//! async mutex that stays locked across the wait, so admissions to one
//! provider complete in arrival order.

use crate::config::RateLimitConfig;
use nexus_core::ProviderKind;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

/// Length of the trailing admission window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Timestamps of recent admissions, oldest first
type Window = VecDeque<Instant>;

/// Drops every admission whose age has reached the window length.
fn prune_window(window: &mut Window, now: Instant) {
    while window
        .front()
        .is_some_and(|&admitted| now.saturating_duration_since(admitted) >= WINDOW)
    {
        window.pop_front();
    }
}

/// Sliding-window rate limiter keyed by provider.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimitConfig,
    windows: HashMap<ProviderKind, Mutex<Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimiter {
    /// Creates a limiter enforcing `limits`.
    pub fn new(limits: RateLimitConfig) -> Self {
        let windows = ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, Mutex::new(Window::new())))
            .collect();
        Self { limits, windows }
    }

    /// Requests-per-minute limit for `kind`; 0 means unlimited.
    pub fn limit_for(&self, kind: ProviderKind) -> u32 {
        self.limits.limit_for(kind)
    }

    /// Waits until a call to `kind` is allowed, records it, and returns how long the caller was held.
    pub async fn admit(&self, kind: ProviderKind) -> Duration {
        let limit = self.limit_for(kind) as usize;
        let Some(window) = self.windows.get(&kind) else {
            return Duration::ZERO;
        };
        if limit == 0 {
            return Duration::ZERO;
        }

        let arrived = Instant::now();
        let mut window = window.lock().await;
        prune_window(&mut window, Instant::now());

        if window.len() >= limit {
            if let Some(&oldest) = window.front() {
                let delay = (oldest + WINDOW).saturating_duration_since(Instant::now());
                info!(
                    "Rate limit reached for {kind} ({limit}/min), waiting {:.2}s",
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
            prune_window(&mut window, Instant::now());
        }

        window.push_back(Instant::now());
        let held = arrived.elapsed();
        debug!(provider = %kind, in_window = window.len(), "Admitted call");
        held
    }

    /// Number of admissions to `kind` still inside the trailing window.
    pub async fn in_flight_window(&self, kind: ProviderKind) -> usize {
        let Some(window) = self.windows.get(&kind) else {
            return 0;
        };
        let mut window = window.lock().await;
        prune_window(&mut window, Instant::now());
        window.len()
    }

    /// Drops stale timestamps for every provider.
    pub async fn prune(&self) {
        let now = Instant::now();
        for window in self.windows.values() {
            prune_window(&mut *window.lock().await, now);
        }
    }
}
