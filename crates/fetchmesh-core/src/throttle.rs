//! Per-provider request throttling.
//!
//! Separate from [`crate::quota::QuotaTracker`]: the quota guards a billed
//! budget across a long window for the whole fetcher, the throttle smooths a
//! single provider's short-term call rate before a request is even sent.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::error::ConfigError;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate gate over one provider's outbound calls.
#[derive(Clone)]
pub struct ProviderThrottle {
    limiter: Arc<DirectRateLimiter>,
    retry_hint: Duration,
}

impl ProviderThrottle {
    pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroThrottleLimit);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroThrottleWindow);
        }

        let burst = NonZeroU32::new(limit).expect("limit checked non-zero");
        let seconds_per_cell = (window.as_secs_f64() / f64::from(limit)).max(0.001);
        let period = Duration::from_secs_f64(seconds_per_cell);
        let quota = Quota::with_period(period)
            .expect("period is always greater than zero")
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            retry_hint: period,
        })
    }

    /// Tries to take one slot. On denial returns the recommended wait before
    /// the next attempt; no network call should be spent.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.retry_hint)
        }
    }
}

impl std::fmt::Debug for ProviderThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderThrottle")
            .field("retry_hint", &self.retry_hint)
            .finish_non_exhaustive()
    }
}
