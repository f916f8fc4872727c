//! Error types for query resolution.
//!
//! Every query in a batch resolves to its own `Result`; a [`QueryError`]
//! attached to one RefID never affects the others.

use gegraph_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using [`QueryError`].
pub type Result<T> = std::result::Result<T, QueryError>;

/// Per-query failure.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query payload or its time range could not be interpreted.
    #[error("Invalid query: {0}")]
    Decode(String),

    /// The upstream fetch failed after its retry budget.
    #[error("Upstream fetch failed: {0}")]
    Upstream(MarketDataError),

    /// The batch was cancelled before this query finished.
    #[error("Query cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Stable machine-readable code, used in serialized responses.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Decode(_) => "INVALID_QUERY",
            QueryError::Upstream(_) => "UPSTREAM_ERROR",
            QueryError::Cancelled => "CANCELLED",
            QueryError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<MarketDataError> for QueryError {
    fn from(err: MarketDataError) -> Self {
        if err.is_cancelled() {
            QueryError::Cancelled
        } else {
            QueryError::Upstream(err)
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gegraph_market_data::ItemId;

    #[test]
    fn test_cancelled_fetch_maps_to_cancelled() {
        let err: QueryError = MarketDataError::Cancelled.into();
        assert!(matches!(err, QueryError::Cancelled));
    }

    #[test]
    fn test_upstream_message_is_preserved() {
        let err: QueryError = MarketDataError::ItemNotFound(ItemId(12)).into();
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(err.to_string().contains("12"));
    }
}
