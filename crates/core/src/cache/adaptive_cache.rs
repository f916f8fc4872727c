//! Cost-bounded, TTL-aware cache of price graphs keyed by item.

use std::mem::size_of;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use gegraph_market_data::{ItemId, SeriesStore};
use log::{debug, warn};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use moka::Expiry;
use serde::Serialize;

use super::ttl::{expires_at, TtlPolicy, DEFAULT_STALE_TTL};
use crate::clock::{Clock, SystemClock};

/// Default cost budget (32 MiB).
pub const DEFAULT_MAX_COST: u64 = 32 * 1024 * 1024;

/// Largest usable budget; per-entry weights are `u32`.
pub const MAX_COST_LIMIT: u64 = u32::MAX as u64;

/// Fixed cost charged for the item key of every entry.
pub const ENTRY_BASE_COST: u64 = size_of::<ItemId>() as u64;

/// Cost charged per stored observation (timestamp plus raw price).
pub const POINT_COST: u64 = (size_of::<DateTime<Utc>>() + size_of::<i64>()) as u64;

/// Approximate memory footprint of a graph, in bytes.
pub fn entry_cost(store: &SeriesStore) -> u64 {
    ENTRY_BASE_COST.saturating_add(POINT_COST.saturating_mul(store.len() as u64))
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Upper bound on the summed cost of live entries.
    pub max_cost: u64,
    /// TTL for graphs whose latest point is not on today's UTC date.
    pub stale_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cost: DEFAULT_MAX_COST,
            stale_ttl: DEFAULT_STALE_TTL,
        }
    }
}

/// A cached graph together with its admission metadata.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub store: Arc<SeriesStore>,
    pub cost: u64,
    pub ttl: Duration,
    pub expires_at: DateTime<Utc>,
}

/// Point-in-time cache counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entry_count: u64,
    pub total_cost: u64,
    pub max_cost: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Hands each entry's own TTL to moka so memory is reclaimed on expiry.
struct EntryExpiry;

impl Expiry<ItemId, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &ItemId,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &ItemId,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Shared cache of item graphs.
///
/// Entries are immutable snapshots: readers get an `Arc` to the store and a
/// later `put` for the same item replaces the entry without touching
/// snapshots already handed out. Freshness is decided against the injected
/// [`Clock`]; an entry is never returned at or after its expiry instant.
pub struct AdaptiveCache {
    entries: Cache<ItemId, CacheEntry>,
    clock: Arc<dyn Clock>,
    ttl_policy: TtlPolicy,
    max_cost: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AdaptiveCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let max_cost = config.max_cost.min(MAX_COST_LIMIT);
        if max_cost < config.max_cost {
            warn!(
                "Cache budget {} exceeds {} bytes, clamping",
                config.max_cost, MAX_COST_LIMIT
            );
        }

        // every put is admitted; eviction takes the least recently used
        let entries = Cache::builder()
            .max_capacity(max_cost)
            .eviction_policy(EvictionPolicy::lru())
            .weigher(|_key: &ItemId, entry: &CacheEntry| -> u32 {
                u32::try_from(entry.cost).unwrap_or(u32::MAX)
            })
            .expire_after(EntryExpiry)
            .build();

        Self {
            entries,
            clock,
            ttl_policy: TtlPolicy::new(config.stale_ttl),
            max_cost,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The fresh graph for `item_id`, if any.
    pub fn get(&self, item_id: ItemId) -> Option<Arc<SeriesStore>> {
        let fresh = self
            .entries
            .get(&item_id)
            .filter(|entry| self.clock.now() < entry.expires_at);

        match fresh {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.store)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Full entry for `item_id`, fresh or not, without touching counters.
    pub fn peek(&self, item_id: ItemId) -> Option<CacheEntry> {
        self.entries.get(&item_id)
    }

    /// Cache `store` for `item_id` and return the shared snapshot.
    ///
    /// The entry's TTL comes from the adaptive policy at the current clock
    /// time. Eviction runs before returning, so the cost budget holds once
    /// every concurrent `put` has returned. A graph whose cost alone exceeds
    /// the budget is not cached; its snapshot is still returned.
    pub fn put(&self, item_id: ItemId, store: SeriesStore) -> Arc<SeriesStore> {
        let now = self.clock.now();
        let ttl = self.ttl_policy.ttl_for(now, &store);
        let cost = entry_cost(&store);
        let store = Arc::new(store);

        if cost > self.max_cost {
            warn!(
                "Graph for item {} costs {} bytes, over the {} byte budget; not caching",
                item_id, cost, self.max_cost
            );
            return store;
        }

        let entry = CacheEntry {
            store: Arc::clone(&store),
            cost,
            ttl,
            expires_at: expires_at(now, ttl),
        };
        debug!(
            "Caching item {} ({} points, {} bytes) for {:?}",
            item_id,
            store.len(),
            cost,
            ttl
        );

        self.entries.insert(item_id, entry);
        self.entries.run_pending_tasks();
        store
    }

    pub fn invalidate(&self, item_id: ItemId) {
        self.entries.invalidate(&item_id);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Apply pending evictions and expirations.
    pub fn sync(&self) {
        self.entries.run_pending_tasks();
    }

    /// Summed cost of resident entries.
    pub fn total_cost(&self) -> u64 {
        self.entries.weighted_size()
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn max_cost(&self) -> u64 {
        self.max_cost
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entry_count(),
            total_cost: self.total_cost(),
            max_cost: self.max_cost,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for AdaptiveCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
