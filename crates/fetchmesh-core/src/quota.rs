//! Rolling-window quota accounting for outbound provider calls.
//!
//! External APIs bill every attempted call, so the counter moves on attempts,
//! not on successes. `try_consume` is the one place in the crate that needs
//! true mutual exclusion: check and increment happen under a single lock so
//! two concurrent fetches can never both take the last slot.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Outcome of an atomic quota check-and-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl QuotaDecision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Usage snapshot reported by [`QuotaTracker::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaStats {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub usage_percentage: f64,
    pub resets_in_secs: u64,
}

#[derive(Debug)]
struct QuotaInner {
    count: u32,
    window_start: Instant,
}

/// Per-fetcher request counter against a fixed limit per rolling window.
#[derive(Debug)]
pub struct QuotaTracker {
    limit: u32,
    window: Duration,
    inner: Mutex<QuotaInner>,
}

impl QuotaTracker {
    pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroQuotaLimit);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroQuotaWindow);
        }
        Ok(Self {
            limit,
            window,
            inner: Mutex::new(QuotaInner {
                count: 0,
                window_start: Instant::now(),
            }),
        })
    }

    /// Atomically rolls the window if elapsed, then either takes one slot or
    /// reports how long until the window resets.
    pub fn try_consume(&self) -> QuotaDecision {
        let mut inner = self.inner.lock().expect("quota lock is not poisoned");
        Self::roll_if_elapsed(&mut inner, self.window);

        if inner.count >= self.limit {
            let elapsed = inner.window_start.elapsed();
            let retry_after = self.window.saturating_sub(elapsed);
            warn!(
                used = inner.count,
                limit = self.limit,
                retry_after_secs = retry_after.as_secs(),
                "quota limit reached"
            );
            return QuotaDecision::Denied { retry_after };
        }

        inner.count += 1;
        let remaining = self.limit - inner.count;
        debug!(used = inner.count, limit = self.limit, remaining, "quota consumed");
        QuotaDecision::Allowed { remaining }
    }

    pub fn usage_percentage(&self) -> f64 {
        let mut inner = self.inner.lock().expect("quota lock is not poisoned");
        Self::roll_if_elapsed(&mut inner, self.window);
        f64::from(inner.count) / f64::from(self.limit) * 100.0
    }

    pub fn remaining(&self) -> u32 {
        let mut inner = self.inner.lock().expect("quota lock is not poisoned");
        Self::roll_if_elapsed(&mut inner, self.window);
        self.limit - inner.count
    }

    pub fn stats(&self) -> QuotaStats {
        let mut inner = self.inner.lock().expect("quota lock is not poisoned");
        Self::roll_if_elapsed(&mut inner, self.window);

        let used = inner.count;
        let resets_in = self.window.saturating_sub(inner.window_start.elapsed());
        QuotaStats {
            used,
            limit: self.limit,
            remaining: self.limit - used,
            usage_percentage: f64::from(used) / f64::from(self.limit) * 100.0,
            resets_in_secs: resets_in.as_secs(),
        }
    }

    /// Pressure message once the budget runs low: critical at <= 10 calls
    /// left, warning at <= 50, notice from 80% used.
    pub fn warning(&self) -> Option<String> {
        let stats = self.stats();
        if stats.remaining <= 10 {
            Some(format!(
                "critical: only {} requests remaining this window ({:.1}% used)",
                stats.remaining, stats.usage_percentage
            ))
        } else if stats.remaining <= 50 {
            Some(format!(
                "warning: {} requests remaining this window ({:.1}% used)",
                stats.remaining, stats.usage_percentage
            ))
        } else if stats.usage_percentage >= 80.0 {
            Some(format!(
                "notice: {:.1}% of window quota used ({} requests remaining)",
                stats.usage_percentage, stats.remaining
            ))
        } else {
            None
        }
    }

    fn roll_if_elapsed(inner: &mut QuotaInner, window: Duration) {
        if inner.window_start.elapsed() >= window {
            debug!(previous_count = inner.count, "quota window rolled over");
            inner.count = 0;
            inner.window_start = Instant::now();
        }
    }
}
