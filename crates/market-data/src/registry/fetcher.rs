//! Bounded-retry wrapper around a [`PriceSource`].
//!
//! The upstream graph API fails intermittently and gives no hint whether a
//! failure is transient, so every error is retried the same way: a fixed
//! delay between attempts and a fixed attempt bound. Each attempt first
//! takes a token from the shared rate limiter.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::{CancelToken, RateLimiter};
use crate::errors::MarketDataError;
use crate::models::{ItemId, SeriesStore};
use crate::provider::PriceSource;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry policy for upstream fetches.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Fixed delay between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Fetches price graphs with bounded retry and cancellation.
pub struct RetryingFetcher {
    source: Arc<dyn PriceSource>,
    rate_limiter: RateLimiter,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Create a fetcher with the default retry policy.
    ///
    /// The rate limiter is sized from the source's declared `rate_limit()`.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self::with_policy(source, RetryPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn PriceSource>, policy: RetryPolicy) -> Self {
        let rate_limiter = RateLimiter::new(&source.rate_limit());
        Self {
            source,
            rate_limiter,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Fetch the graph for `item_id`.
    ///
    /// Returns `Cancelled` as soon as `cancel` fires, whether the fetcher is
    /// waiting on the rate limiter, the upstream or the retry delay. When
    /// every attempt fails the error of the final attempt is returned inside
    /// `RetriesExhausted`. An empty series counts as a failed attempt.
    pub async fn fetch(
        &self,
        item_id: ItemId,
        cancel: &CancelToken,
    ) -> Result<SeriesStore, MarketDataError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
                outcome = self.attempt(item_id) => outcome,
            };

            let err = match outcome {
                Ok(store) => {
                    debug!(
                        "Fetched {} point(s) for item {} from '{}' (attempt {}/{})",
                        store.len(),
                        item_id,
                        self.source.id(),
                        attempt,
                        max_attempts
                    );
                    return Ok(store);
                }
                Err(err) => err,
            };

            if attempt >= max_attempts {
                warn!(
                    "Giving up on item {} after {} attempt(s): {}",
                    item_id, attempt, err
                );
                return Err(MarketDataError::RetriesExhausted {
                    item_id,
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            warn!(
                "Fetch attempt {}/{} for item {} failed: {}, retrying in {:?}",
                attempt, max_attempts, item_id, err, self.policy.delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
                _ = tokio::time::sleep(self.policy.delay) => {}
            }
        }
    }

    async fn attempt(&self, item_id: ItemId) -> Result<SeriesStore, MarketDataError> {
        self.rate_limiter.acquire().await;

        let store = self.source.fetch_graph(item_id).await?;
        if store.is_empty() {
            return Err(MarketDataError::EmptyGraph(item_id));
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RateLimit;
    use crate::registry::cancel_pair;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then succeeds.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        empty: bool,
    }

    impl FlakySource {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                empty: false,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for FlakySource {
        fn id(&self) -> &'static str {
            "FLAKY"
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                requests_per_minute: 60_000,
                burst: 100,
                ..Default::default()
            }
        }

        async fn fetch_graph(&self, item_id: ItemId) -> Result<SeriesStore, MarketDataError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.empty {
                return Ok(SeriesStore::new(item_id));
            }
            if call < self.failures {
                return Err(MarketDataError::Upstream {
                    provider: "FLAKY".to_string(),
                    message: format!("failure #{}", call + 1),
                });
            }
            let ts = Utc.with_ymd_and_hms(2021, 1, 5, 0, 0, 0).unwrap();
            Ok(SeriesStore::from_points(item_id, vec![(ts, 100)]))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_try() {
        let source = Arc::new(FlakySource::new(0));
        let fetcher = RetryingFetcher::new(source.clone());

        let store = fetcher.fetch(ItemId(1), &CancelToken::never()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let source = Arc::new(FlakySource::new(2));
        let fetcher = RetryingFetcher::new(source.clone());

        let start = tokio::time::Instant::now();
        let store = fetcher.fetch(ItemId(1), &CancelToken::never()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(source.calls(), 3);
        // two fixed delays between three attempts
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retry_bound() {
        let source = Arc::new(FlakySource::new(u32::MAX));
        let fetcher = RetryingFetcher::new(source.clone());

        let err = fetcher
            .fetch(ItemId(9), &CancelToken::never())
            .await
            .unwrap_err();

        assert_eq!(source.calls(), 4);
        match err {
            MarketDataError::RetriesExhausted {
                item_id,
                attempts,
                last,
            } => {
                assert_eq!(item_id, ItemId(9));
                assert_eq!(attempts, 4);
                assert!(last.to_string().contains("failure #4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_graph_is_a_failure() {
        let source = Arc::new(FlakySource {
            empty: true,
            ..FlakySource::new(0)
        });
        let policy = RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(10),
        };
        let fetcher = RetryingFetcher::with_policy(source.clone(), policy);

        let err = fetcher
            .fetch(ItemId(3), &CancelToken::never())
            .await
            .unwrap_err();

        assert_eq!(source.calls(), 2);
        assert!(matches!(
            err,
            MarketDataError::RetriesExhausted { ref last, .. }
                if matches!(**last, MarketDataError::EmptyGraph(ItemId(3)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_retries() {
        let source = Arc::new(FlakySource::new(u32::MAX));
        let fetcher = RetryingFetcher::new(source.clone());
        let (handle, token) = cancel_pair();
        let _timer = handle.cancel_after(Duration::from_millis(1500));

        let err = fetcher.fetch(ItemId(1), &token).await.unwrap_err();

        assert!(err.is_cancelled());
        // attempts at t=0s and t=1s, cancelled during the second delay
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_makes_no_call() {
        let source = Arc::new(FlakySource::new(0));
        let fetcher = RetryingFetcher::new(source.clone());
        let (handle, token) = cancel_pair();
        handle.cancel();

        let err = fetcher.fetch(ItemId(1), &token).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Cancelled));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
