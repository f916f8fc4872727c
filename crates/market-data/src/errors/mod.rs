//! Error types for the market data crate.
//!
//! The upstream graph API gives no usable distinction between transient and
//! permanent failures, so errors are not classified for retry purposes. The
//! [`RetryingFetcher`](crate::registry::RetryingFetcher) retries every failure
//! up to its bound.

use thiserror::Error;

use crate::models::ItemId;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The item is not present in the item database.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// The upstream returned a graph without a single price point.
    /// An empty series is never cached.
    #[error("Empty price graph for item {0}")]
    EmptyGraph(ItemId),

    /// The upstream answered with a non-success status.
    #[error("Upstream error: {provider} - {message}")]
    Upstream {
        /// The source that returned the error
        provider: String,
        /// Status or message returned by the source
        message: String,
    },

    /// The upstream response could not be decoded.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The source that returned the response
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// Every fetch attempt failed. Carries the error of the final attempt.
    #[error("Fetch for item {item_id} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        item_id: ItemId,
        attempts: u32,
        last: Box<MarketDataError>,
    },

    /// The caller cancelled the request before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// The item database could not be loaded or searched.
    #[error("Item database error: {0}")]
    ItemDb(String),

    /// A network error occurred while communicating with the upstream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarketDataError {
    /// Whether this error came from cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::RetriesExhausted { last, .. } => last.is_cancelled(),
            _ => false,
        }
    }
}
