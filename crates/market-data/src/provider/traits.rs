//! Price source trait definitions.
//!
//! This module defines the `PriceSource` trait that every upstream
//! price graph implementation must provide.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ItemId, SeriesStore};

use super::capabilities::RateLimit;

/// Trait for upstream price graph sources.
///
/// A source performs exactly one request per call and never retries on its
/// own; retrying and caching are layered on top by the fetcher and the cache.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use gegraph_market_data::provider::{PriceSource, RateLimit};
///
/// struct FixtureSource;
///
/// #[async_trait]
/// impl PriceSource for FixtureSource {
///     fn id(&self) -> &'static str {
///         "FIXTURE"
///     }
///
///     async fn fetch_graph(&self, item_id: ItemId) -> Result<SeriesStore, MarketDataError> {
///         Ok(SeriesStore::new(item_id))
///     }
/// }
/// ```
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Unique identifier for this source.
    ///
    /// Should be a constant string like "RUNESCAPE_GE".
    /// Used for logging and error reporting.
    fn id(&self) -> &'static str;

    /// Rate limiting configuration.
    ///
    /// The fetcher sizes its token bucket from this.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch the full price graph for an item.
    ///
    /// # Returns
    ///
    /// The item's series on success. Implementations should return
    /// `MarketDataError::EmptyGraph` rather than an empty store.
    async fn fetch_graph(&self, item_id: ItemId) -> Result<SeriesStore, MarketDataError>;
}
