//! Price source abstractions and implementations.
//!
//! This module contains:
//! - The `PriceSource` trait that all upstream sources implement
//! - Rate limiting configuration
//! - The RuneScape Grand Exchange graph source

mod capabilities;
mod traits;

pub mod runescape;

// Re-exports
pub use capabilities::RateLimit;
pub use runescape::{RuneScapeGraphSource, RuneScapeGraphSourceConfig};
pub use traits::PriceSource;
