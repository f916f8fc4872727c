//! Upstream fetch orchestration.
//!
//! This module wraps a [`PriceSource`](crate::provider::PriceSource) with:
//! - Bounded retry with a fixed delay
//! - Rate limiting shared by all fetches
//! - Cancellation of in-flight fetches

mod cancel;
mod fetcher;
mod rate_limiter;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use fetcher::{RetryPolicy, RetryingFetcher, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
pub use rate_limiter::RateLimiter;
