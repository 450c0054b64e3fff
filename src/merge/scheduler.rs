//! Strategies deciding when a buffered item may start.
//!
//! A scheduler only delays the start of items taken from the buffer. Items
//! that find a free slot on arrival start immediately.

use std::time::Duration;

use async_trait::async_trait;
use leaky_bucket::RateLimiter;

/// Decides when a deferred start may proceed.
///
/// The slot for the deferred item is reserved while [`ready`](Self::ready)
/// is pending, so the concurrency limit is never exceeded.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Resolve once the next buffered item may start.
    async fn ready(&self);
}

/// Yields to the runtime once before starting.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

#[async_trait]
impl Scheduler for ImmediateScheduler {
    async fn ready(&self) { tokio::task::yield_now().await; }
}

/// Waits a fixed delay before each deferred start.
#[derive(Clone, Copy, Debug)]
pub struct DelayScheduler {
    delay: Duration,
}

impl DelayScheduler {
    /// Create a scheduler delaying every deferred start by `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self { Self { delay } }
}

#[async_trait]
impl Scheduler for DelayScheduler {
    async fn ready(&self) { tokio::time::sleep(self.delay).await; }
}

/// Admits at most `rate` deferred starts per second.
pub struct RateLimitedScheduler {
    limiter: RateLimiter,
}

impl RateLimitedScheduler {
    /// Create a limiter admitting `rate` starts per second with a burst of
    /// the same size. A rate of zero is treated as one.
    #[must_use]
    pub fn per_second(rate: usize) -> Self {
        let rate = rate.max(1);
        Self {
            limiter: RateLimiter::builder()
                .initial(rate)
                .refill(rate)
                .interval(Duration::from_secs(1))
                .max(rate)
                .build(),
        }
    }
}

impl std::fmt::Debug for RateLimitedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedScheduler").finish_non_exhaustive()
    }
}

#[async_trait]
impl Scheduler for RateLimitedScheduler {
    async fn ready(&self) { self.limiter.acquire_one().await; }
}
