//! Cache storage implementation using an in-memory `HashMap`.
//!
//! Entries expire after a single global TTL. Expired entries are never served;
//! they are dropped on lookup or by a periodic sweep, whichever comes first.

use super::ResponseStore;
use super::fingerprint::fingerprint;
use crate::Result;
use crate::config::CacheConfig;
use chrono::{DateTime, TimeDelta, Utc};
use nexus_core::{Clock, IgnoreLock as _, Request, Response, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A cached response with its insertion time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    /// The cached response
    pub response: Response,
    /// When this entry was stored
    pub inserted_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Whether this entry has lived for at least `ttl` as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.inserted_at >= ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of entries in the cache
    pub entries: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedResponse>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    /// Evicts the oldest entry from the cache
    fn evict_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, cached)| cached.inserted_at)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }
}

/// In-memory response cache with TTL-based expiration
pub struct ResponseCache {
    state: Mutex<CacheState>,
    config: CacheConfig,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates a cache using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = TimeDelta::from_std(config.ttl()).unwrap_or(TimeDelta::MAX);
        Self {
            state: Mutex::new(CacheState::default()),
            config,
            ttl,
            clock,
        }
    }

    /// Removes every entry and resets the tallies
    pub fn clear(&self) {
        *self.state.lock_ignore_poison() = CacheState::default();
    }

    /// Returns whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock_ignore_poison().entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResponseStore for ResponseCache {
    fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let key = fingerprint(request);
        let now = self.clock.now();
        let mut state = self.state.lock_ignore_poison();

        let expired = state
            .entries
            .get(&key)
            .map(|cached| cached.is_expired(now, self.ttl));
        let found = match expired {
            Some(false) => state.entries.get(&key).map(|cached| cached.response.clone()),
            Some(true) => {
                debug!(request_id = %request.id, "Dropping expired cache entry");
                state.entries.remove(&key);
                None
            }
            None => None,
        };

        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        drop(state);
        Ok(found)
    }

    fn store(&self, request: &Request, response: &Response) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let key = fingerprint(request);
        let cached = CachedResponse {
            response: response.clone(),
            inserted_at: self.clock.now(),
        };

        let mut state = self.state.lock_ignore_poison();
        if self.config.max_entries > 0 && !state.entries.contains_key(&key) {
            while state.entries.len() >= self.config.max_entries {
                state.evict_oldest();
            }
        }
        state.entries.insert(key, cached);
        drop(state);
        Ok(())
    }

    fn sweep(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut state = self.state.lock_ignore_poison();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, cached| !cached.is_expired(now, self.ttl));
        let removed = before - state.entries.len();
        drop(state);

        if removed > 0 {
            debug!("Swept {removed} expired cache entries");
        }
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.state.lock_ignore_poison().entries.len())
    }

    fn stats(&self) -> Result<CacheStats> {
        let state = self.state.lock_ignore_poison();
        Ok(CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        })
    }
}
