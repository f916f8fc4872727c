//! Adaptive time-to-live for cached price graphs.
//!
//! The upstream publishes one new point per UTC day. A graph whose latest
//! point falls on today's UTC date cannot change before the next UTC
//! midnight, so it is cached until then. Anything else may be updated at any
//! moment and only gets a short stale TTL.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use gegraph_market_data::SeriesStore;

/// TTL for graphs that are not current.
pub const DEFAULT_STALE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
pub struct TtlPolicy {
    pub stale_ttl: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            stale_ttl: DEFAULT_STALE_TTL,
        }
    }
}

impl TtlPolicy {
    pub fn new(stale_ttl: Duration) -> Self {
        Self { stale_ttl }
    }

    /// TTL for `store` when inserted at `now`.
    pub fn ttl_for(&self, now: DateTime<Utc>, store: &SeriesStore) -> Duration {
        let Some(latest) = store.latest_timestamp() else {
            return self.stale_ttl;
        };

        if latest.date_naive() != now.date_naive() {
            return self.stale_ttl;
        }

        next_utc_midnight(now)
            .and_then(|midnight| (midnight - now).to_std().ok())
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.stale_ttl)
    }
}

/// TTL for `store` under the default policy.
pub fn adaptive_ttl(now: DateTime<Utc>, store: &SeriesStore) -> Duration {
    TtlPolicy::default().ttl_for(now, store)
}

fn next_utc_midnight(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let midnight = now.date_naive().succ_opt()?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Absolute expiry of an entry inserted at `now`, saturating on overflow.
pub(crate) fn expires_at(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
