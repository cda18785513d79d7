//! Orchestrator configuration
//!
//! Defaults are usable as-is. A TOML file may override any subset of fields:
//!
//! ```toml
//! max_concurrency = 8
//!
//! [cache]
//! max_entries = 5000
//! result_ttl_ms = 600000
//!
//! [intent_retry]
//! max_attempts = 3
//! delay_ms = 250
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fixed-count, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (minimum 1)
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay_ms: u64,
    /// Per-attempt deadline
    pub timeout_ms: Option<u64>,
}

impl RetryPolicy {
    /// Single attempt, no deadline
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
            timeout_ms: None,
        }
    }

    /// `max_attempts` attempts, `delay` apart
    #[inline]
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: millis(delay),
            timeout_ms: None,
        }
    }

    /// With per-attempt deadline
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis(timeout));
        self
    }

    /// Pause between attempts
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Per-attempt deadline
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Cache sizing and lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached values across all stages
    pub max_entries: usize,
    /// Lifetime of whole-pipeline results
    pub result_ttl_ms: u64,
    /// Lifetime of individual stage outputs
    pub stage_ttl_ms: u64,
    /// Background sweep period (0 disables the sweep)
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            result_ttl_ms: 30 * 60 * 1_000,
            stage_ttl_ms: 60 * 60 * 1_000,
            sweep_interval_ms: 5 * 60 * 1_000,
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Cache settings
    pub cache: CacheConfig,
    /// Parallel executor ceiling
    pub max_concurrency: usize,
    /// Retry policy for intent parsing
    pub intent_retry: RetryPolicy,
    /// Retry policy for every other stage
    pub stage_retry: RetryPolicy,
    /// Shortest accepted intent (trimmed, in characters)
    pub min_intent_chars: usize,
    /// Longest accepted intent (trimmed, in characters)
    pub max_intent_chars: usize,
    /// Largest operation list accepted by direct workflow analysis
    pub max_operations: usize,
    /// Largest effort estimate accepted on a caller-supplied operation
    pub max_effort_points: u32,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML
    ///
    /// # Errors
    /// Returns `ConfigError` on malformed TOML or out-of-range values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or is invalid
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrency must be at least 1".into(),
            ));
        }
        if self.intent_retry.max_attempts == 0 || self.stage_retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry max_attempts must be at least 1".into(),
            ));
        }
        if self.min_intent_chars == 0 || self.min_intent_chars > self.max_intent_chars {
            return Err(ConfigError::Invalid(format!(
                "intent length bounds are inconsistent: min {} max {}",
                self.min_intent_chars, self.max_intent_chars
            )));
        }
        if self.max_operations == 0 {
            return Err(ConfigError::Invalid(
                "max_operations must be at least 1".into(),
            ));
        }
        if self.max_effort_points == 0 {
            return Err(ConfigError::Invalid(
                "max_effort_points must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// With executor concurrency
    #[inline]
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.cache.max_entries = max;
        self
    }

    /// With whole-pipeline result TTL
    #[inline]
    #[must_use]
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.cache.result_ttl_ms = millis(ttl);
        self
    }

    /// With stage output TTL
    #[inline]
    #[must_use]
    pub fn with_stage_ttl(mut self, ttl: Duration) -> Self {
        self.cache.stage_ttl_ms = millis(ttl);
        self
    }

    /// With sweep interval
    #[inline]
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.cache.sweep_interval_ms = millis(interval);
        self
    }

    /// With intent retry policy
    #[inline]
    #[must_use]
    pub fn with_intent_retry(mut self, policy: RetryPolicy) -> Self {
        self.intent_retry = policy;
        self
    }

    /// With retry policy for the remaining stages
    #[inline]
    #[must_use]
    pub fn with_stage_retry(mut self, policy: RetryPolicy) -> Self {
        self.stage_retry = policy;
        self
    }

    /// Whole-pipeline result TTL
    #[inline]
    #[must_use]
    pub fn result_ttl(&self) -> Duration {
        Duration::from_millis(self.cache.result_ttl_ms)
    }

    /// Stage output TTL
    #[inline]
    #[must_use]
    pub fn stage_ttl(&self) -> Duration {
        Duration::from_millis(self.cache.stage_ttl_ms)
    }

    /// Sweep interval
    #[inline]
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cache.sweep_interval_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            max_concurrency: 4,
            intent_retry: RetryPolicy::fixed(2, Duration::from_millis(100)),
            stage_retry: RetryPolicy::none(),
            min_intent_chars: 10,
            max_intent_chars: 10_000,
            max_operations: 50,
            max_effort_points: 1_000,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
