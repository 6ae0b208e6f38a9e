//! Configuration for routing, caching, rate limiting, and user tiers.

use crate::error::{Result, RoutingError};
use crate::router::{RoutingStrategy, UserTier};
use dirs::home_dir;
use nexus_core::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = ".nexus";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the routing strategy.
pub const STRATEGY_ENV: &str = "NEXUS_STRATEGY";
/// Environment variable overriding the cache TTL in seconds.
pub const CACHE_TTL_ENV: &str = "NEXUS_CACHE_TTL_SECONDS";
/// Environment variable toggling the cache.
pub const CACHE_ENABLED_ENV: &str = "NEXUS_CACHE_ENABLED";

/// Complete orchestrator configuration.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Strategy used when routing
    pub strategy: RoutingStrategy,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Per-provider admission limits
    pub rate_limits: RateLimitConfig,
    /// User tier assignments
    pub user_tiers: UserTierConfig,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// Time-to-live for cache entries in seconds
    pub ttl_seconds: u64,
    /// Maximum number of cached responses
    pub max_entries: usize,
    /// Seconds between expiry sweeps
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            max_entries: 10_000,
            sweep_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    /// TTL as a duration.
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Sweep interval as a duration.
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// Requests-per-minute limits. A limit of 0 disables throttling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Limit for providers without an explicit entry
    pub default_rpm: u32,
    /// Limits keyed by provider wire name
    pub per_provider: BTreeMap<String, u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let per_provider = [
            (ProviderKind::OpenAi, 1000),
            (ProviderKind::Anthropic, 500),
            (ProviderKind::Google, 600),
            (ProviderKind::Local, 0),
        ]
        .into_iter()
        .map(|(kind, rpm)| (kind.as_str().to_owned(), rpm))
        .collect();

        Self {
            default_rpm: 60,
            per_provider,
        }
    }
}

impl RateLimitConfig {
    /// Effective limit for `kind`.
    pub fn limit_for(&self, kind: ProviderKind) -> u32 {
        self.per_provider
            .get(kind.as_str())
            .copied()
            .unwrap_or(self.default_rpm)
    }
}

/// Assignment of users to billing tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserTierConfig {
    /// Tier for users without an explicit entry
    pub default_tier: UserTier,
    /// Tiers keyed by user id
    pub users: BTreeMap<String, UserTier>,
}

impl UserTierConfig {
    /// Tier of `user_id`.
    pub fn tier_for(&self, user_id: &str) -> UserTier {
        self.users
            .get(user_id)
            .copied()
            .unwrap_or(self.default_tier)
    }
}

impl OrchestratorConfig {
    /// Directory holding the configuration file, `~/.nexus`.
    ///
    /// # Errors
    /// Returns a configuration error when no home directory is known.
    pub fn config_dir() -> Result<PathBuf> {
        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or_else(|| RoutingError::Configuration("no home directory".to_owned()))
    }

    /// Default configuration file, `~/.nexus/config.toml`.
    ///
    /// # Errors
    /// Returns a configuration error when no home directory is known.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Reads the default configuration file, writing defaults there on first run.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, validated, or created.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path()?)
    }

    /// Reads `path`, writing defaults there first if nothing exists yet.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, validated, or created.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.try_exists()? {
            return Self::load_from_file(path);
        }
        let config = Self::default();
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let header = "# Nexus Orchestrator Configuration\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize routing, caching, and rate limits\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns a configuration error if an override cannot be parsed
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(strategy) = lookup(STRATEGY_ENV) {
            self.strategy = strategy.parse()?;
        }
        if let Some(ttl) = lookup(CACHE_TTL_ENV) {
            self.cache.ttl_seconds = ttl.trim().parse().map_err(|error| {
                RoutingError::Configuration(format!("{CACHE_TTL_ENV}={ttl}: {error}"))
            })?;
        }
        if let Some(enabled) = lookup(CACHE_ENABLED_ENV) {
            self.cache.enabled = match enabled.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(RoutingError::Configuration(format!(
                        "{CACHE_ENABLED_ENV}={other}: expected a boolean"
                    )));
                }
            };
        }
        self.validate()
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    /// Returns a configuration error if an environment value cannot be parsed
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Check values that would make the orchestrator misbehave.
    ///
    /// # Errors
    /// Returns a configuration error describing the first bad value
    pub fn validate(&self) -> Result<()> {
        if let Some(unknown) = self
            .rate_limits
            .per_provider
            .keys()
            .find(|name| name.parse::<ProviderKind>().is_err())
        {
            return Err(RoutingError::Configuration(format!(
                "unknown provider in rate_limits.per_provider: {unknown}"
            )));
        }
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(RoutingError::Configuration(
                "cache.ttl_seconds must be positive when the cache is enabled".to_owned(),
            ));
        }
        if self.cache.sweep_interval_seconds == 0 {
            return Err(RoutingError::Configuration(
                "cache.sweep_interval_seconds must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
