use governor::{Quota, RateLimiter as GovernorRateLimiter};
use nonzero_ext::*;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::sleep;

/// Paces calls against the validation authority.
///
/// Shared by every validation task; `wait` is safe to call concurrently
/// and admits one caller per configured interval.
pub struct RateLimiter {
    limiter: GovernorRateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl RateLimiter {
    /// One permit per `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let quota = Quota::with_period(interval).unwrap_or_else(|| Quota::per_second(nonzero!(1u32)));
        Self {
            limiter: GovernorRateLimiter::direct(quota),
        }
    }

    /// `requests_per_second` permits per second.
    pub fn per_second(requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32)),
        );
        Self {
            limiter: GovernorRateLimiter::direct(quota),
        }
    }

    /// Wait until a call is allowed.
    pub async fn wait(&self) {
        while self.limiter.check().is_err() {
            sleep(Duration::from_millis(50)).await;
        }
    }
}
