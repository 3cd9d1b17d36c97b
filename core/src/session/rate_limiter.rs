//! Run-wide request rate limiting

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::time::Duration;

/// Interval between requests at `rps` requests per second
///
/// `None` when the rate is not positive and finite, or when the interval
/// does not fit a non-zero [`Duration`].
pub fn rate_period(rps: f64) -> Option<Duration> {
    if !rps.is_finite() || rps <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rps)
        .ok()
        .filter(|period| !period.is_zero())
}

/// Token-bucket limiter shared by every batch of every session
///
/// Fractional rates are honoured: 0.5 rps admits one request every two
/// seconds.
pub struct RequestRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate_limit: Option<f64>,
}

impl RequestRateLimiter {
    /// Create a limiter; `None` or a non-positive rate disables limiting
    pub fn new(rate_limit: Option<f64>) -> Self {
        let limiter = rate_limit
            .and_then(rate_period)
            .and_then(Quota::with_period)
            .map(RateLimiter::direct);

        Self {
            limiter,
            rate_limit,
        }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Wait until the next request may be issued
    pub async fn wait(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Whether limiting is active
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Configured requests per second
    pub fn rate_limit(&self) -> Option<f64> {
        self.rate_limit
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl std::fmt::Debug for RequestRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRateLimiter")
            .field("rate_limit", &self.rate_limit)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
