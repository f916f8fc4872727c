//! Price graph cache
//!
//! - `ttl` - Adaptive TTL derived from the graph's latest point
//! - `adaptive_cache` - Cost-bounded cache of immutable graph snapshots

mod adaptive_cache;
mod ttl;

pub use adaptive_cache::{
    entry_cost, AdaptiveCache, CacheConfig, CacheEntry, CacheStats, DEFAULT_MAX_COST,
    ENTRY_BASE_COST, MAX_COST_LIMIT, POINT_COST,
};
pub use ttl::{adaptive_ttl, TtlPolicy, DEFAULT_STALE_TTL};
