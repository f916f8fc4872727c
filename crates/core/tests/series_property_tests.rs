//! Property-based tests for range filtering, adaptive TTL and cost accounting.
//!
//! These tests check invariants over random graphs and query windows using
//! the `proptest` crate.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use gegraph_core::cache::{
    adaptive_ttl, entry_cost, AdaptiveCache, CacheConfig, DEFAULT_STALE_TTL,
};
use gegraph_core::ManualClock;
use gegraph_market_data::{ItemId, SeriesStore, TimeRange};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn epoch_day(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + ChronoDuration::days(day)
}

/// Generates a daily graph with up to 200 points over a year.
fn arb_graph() -> impl Strategy<Value = SeriesStore> {
    proptest::collection::btree_map(0i64..365, 1i64..1_000_000_000, 0..200).prop_map(|days| {
        SeriesStore::from_points(
            ItemId(4151),
            days.into_iter().map(|(day, price)| (epoch_day(day), price)),
        )
    })
}

/// Generates a query window, possibly empty or inverted.
fn arb_range() -> impl Strategy<Value = TimeRange> {
    (-10i64..375, -10i64..375).prop_map(|(from, to)| TimeRange::new(epoch_day(from), epoch_day(to)))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Filtering returns exactly the points strictly inside the window.
    #[test]
    fn prop_filter_matches_exclusive_bounds(store in arb_graph(), range in arb_range()) {
        let filtered: Vec<_> = store.filter_sorted(&range).collect();
        let expected: Vec<_> = store
            .iter()
            .filter(|point| range.from < point.timestamp && point.timestamp < range.to)
            .collect();

        prop_assert_eq!(filtered, expected);
    }

    /// Output timestamps are strictly ascending and unique.
    #[test]
    fn prop_filter_is_strictly_ascending(store in arb_graph(), range in arb_range()) {
        let times: Vec<_> = store.filter_sorted(&range).map(|p| p.timestamp).collect();
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(times.iter().collect::<BTreeSet<_>>().len(), times.len());
    }

    /// A cloned iterator restarts the same walk.
    #[test]
    fn prop_filter_is_restartable(store in arb_graph(), range in arb_range()) {
        let iter = store.filter_sorted(&range);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        prop_assert_eq!(first, second);
    }

    /// TTL never exceeds one day, and is the stale TTL unless the graph is current.
    #[test]
    fn prop_ttl_bounds(store in arb_graph(), day in 0i64..365, secs in 0i64..86_400) {
        let now = epoch_day(day) + ChronoDuration::seconds(secs);
        let ttl = adaptive_ttl(now, &store);

        let current = store
            .latest_timestamp()
            .is_some_and(|latest| latest.date_naive() == now.date_naive());

        if current {
            prop_assert_eq!(ttl, Duration::from_secs((86_400 - secs) as u64));
        } else {
            prop_assert_eq!(ttl, DEFAULT_STALE_TTL);
        }
        prop_assert!(ttl <= Duration::from_secs(86_400));
    }

    /// Any sequence of puts leaves the resident cost within budget.
    #[test]
    fn prop_budget_holds_after_puts(
        puts in proptest::collection::vec((0i64..64, arb_graph()), 1..40),
        budget in 500u64..20_000,
    ) {
        let clock = Arc::new(ManualClock::new(epoch_day(200)));
        let cache = AdaptiveCache::with_clock(
            CacheConfig { max_cost: budget, ..Default::default() },
            clock,
        );

        for (item, store) in puts {
            let cost = entry_cost(&store);
            let snapshot = cache.put(ItemId(item), store);
            prop_assert_eq!(entry_cost(&snapshot), cost);
            prop_assert!(cache.total_cost() <= budget);
        }
    }
}
