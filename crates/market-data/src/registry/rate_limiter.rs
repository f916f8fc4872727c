//! Token bucket rate limiter for the upstream price source.
//!
//! All fetches share one bucket, sized from the source's declared
//! [`RateLimit`]. Concurrent query tasks that miss the cache at the same time
//! queue here instead of hammering the upstream.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::provider::RateLimit;

/// Token bucket state.
#[derive(Debug)]
struct TokenBucket {
    /// Current number of available tokens.
    tokens: f64,
    /// Last time the bucket was updated.
    last_update: Instant,
    /// Token refill rate (tokens per second).
    rate: f64,
    /// Maximum bucket capacity.
    capacity: f64,
}

impl TokenBucket {
    fn with_config(requests_per_minute: u32, capacity: u32) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    /// Take a token if one is available, otherwise report the wait time.
    fn take_or_wait(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(tokens_needed / self.rate))
        }
    }
}

/// Rate limiter for the upstream price source.
///
/// Thread-safe; shared by every fetch issued through one
/// [`RetryingFetcher`](super::RetryingFetcher).
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Create a limiter from a source's declared limits.
    pub fn new(limit: &RateLimit) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::with_config(
                limit.requests_per_minute,
                limit.burst,
            )),
        }
    }

    /// Lock the bucket, recovering from poison if necessary.
    ///
    /// A poisoned bucket only means slightly inaccurate throttling.
    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Acquire a token, waiting (asynchronously) until one is available.
    pub async fn acquire(&self) {
        loop {
            let wait_time = match self.lock_bucket().take_or_wait() {
                None => return,
                Some(wait) => wait,
            };

            debug!("Rate limiter: waiting {:?} for upstream token", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Try to acquire a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.lock_bucket().take_or_wait().is_none()
    }

    /// Tokens currently available.
    pub fn remaining_tokens(&self) -> f64 {
        let mut bucket = self.lock_bucket();
        bucket.refill();
        bucket.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimit::default())
    }
}
