//! Market data models
//!
//! This module contains the core data types for price graph operations:
//! - `item` - Item identity (ItemId) and item database records (Item)
//! - `series` - Price series storage (SeriesStore), output points (PricePoint)
//!   and query windows (TimeRange)

mod item;
mod series;

pub use item::{Item, ItemId};
pub use series::{FilterSorted, PricePoint, SeriesStore, TimeRange};
