//! Typed fetcher configuration, validated once at construction.

use std::time::Duration;

use crate::error::ConfigError;

/// Cache and quota settings owned by one [`crate::fetcher::CachedFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// TTL applied to every successful fetch written to the cache.
    pub cache_ttl: Duration,
    /// Outbound call budget per quota window.
    pub quota_limit: u32,
    /// Length of the rolling quota window.
    pub quota_window: Duration,
}

impl FetcherConfig {
    pub fn new(cache_ttl: Duration, quota_limit: u32, quota_window: Duration) -> Result<Self, ConfigError> {
        let config = Self {
            cache_ttl,
            quota_limit,
            quota_window,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ZeroCacheTtl);
        }
        if self.quota_limit == 0 {
            return Err(ConfigError::ZeroQuotaLimit);
        }
        if self.quota_window.is_zero() {
            return Err(ConfigError::ZeroQuotaWindow);
        }
        Ok(())
    }
}

impl Default for FetcherConfig {
    /// Free-tier exchange-rate defaults: one-hour cache, 1500 calls per
    /// rolling 30 days.
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            quota_limit: 1500,
            quota_window: Duration::from_secs(30 * 24 * 3600),
        }
    }
}
