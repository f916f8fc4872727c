//! Item name and identifier lookup.
//!
//! The catalog is consumed synchronously: by the search resource endpoint and
//! by the query engine when it labels a series with the item's name.

mod item_db;

pub use item_db::{ItemDb, DEFAULT_SEARCH_LIMIT};

use crate::errors::MarketDataError;
use crate::models::{Item, ItemId};

/// Trait for item lookup and search backends.
pub trait ItemCatalog: Send + Sync {
    /// Resolve an item by identifier.
    fn lookup(&self, item_id: ItemId) -> Result<Item, MarketDataError>;

    /// Find items matching free text.
    fn search(&self, text: &str) -> Result<Vec<Item>, MarketDataError>;
}
