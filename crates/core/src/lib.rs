//! GE Graph Core - price graph cache and query engine.
//!
//! This crate sits between the host-facing server and the upstream price
//! source. It owns the adaptive cache of item graphs and the engine that
//! resolves a batch of queries concurrently against it.
//!
//! - [`AdaptiveCache`] - cost-bounded cache whose TTL follows the graph's
//!   publication schedule
//! - [`QueryEngine`] - per-query fan-out with cancellation and isolated
//!   failures

pub mod cache;
pub mod clock;
pub mod errors;
pub mod query;

pub use cache::{AdaptiveCache, CacheConfig, CacheStats};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{QueryError, Result};
pub use query::{DataQuery, QueryEngine, QueryResponse, QueryResult, SeriesFrame};
