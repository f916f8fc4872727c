//! GE Graph Market Data Crate
//!
//! This crate provides the upstream side of the GE Graph datasource: the
//! price series model, the price source that fetches item graphs from the
//! RuneScape Grand Exchange, and the item database used for name lookup.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Query Engine   | --> | RetryingFetcher  |  (bounded retry, cancellation)
//! +------------------+     +------------------+
//!         |                        |
//!         |                        v
//!         |                +------------------+
//!         |                |   RateLimiter    |  (token bucket)
//!         |                +------------------+
//!         |                        |
//!         |                        v
//!         |                +------------------+
//!         |                |   PriceSource    |  (RuneScape GE graph API)
//!         |                +------------------+
//!         |                        |
//!         v                        v
//! +------------------+     +------------------+
//! |   ItemCatalog    |     |   SeriesStore    |  (timestamp -> price)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ItemId`] - Grand Exchange item identifier
//! - [`SeriesStore`] - Price history of one item
//! - [`TimeRange`] - Query window, filtered with exclusive bounds
//! - [`PricePoint`] - One output observation
//! - [`Item`] - Item database record

pub mod catalog;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{FilterSorted, Item, ItemId, PricePoint, SeriesStore, TimeRange};

// Re-export catalog types
pub use catalog::{ItemCatalog, ItemDb};

// Re-export provider types
pub use provider::{PriceSource, RateLimit, RuneScapeGraphSource, RuneScapeGraphSourceConfig};

// Re-export registry types
pub use registry::{
    cancel_pair, CancelHandle, CancelToken, RateLimiter, RetryPolicy, RetryingFetcher,
};

pub use errors::MarketDataError;
