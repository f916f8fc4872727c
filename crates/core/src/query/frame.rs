//! Query results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gegraph_market_data::PricePoint;
use serde::Serialize;

use crate::errors::QueryError;

/// Name given to every result frame.
pub const FRAME_NAME: &str = "response";

/// Name of the timestamp column.
pub const TIME_FIELD: &str = "time";

/// Series label used when the item has no known name.
pub const DEFAULT_SERIES_LABEL: &str = "price";

/// A time series: ascending timestamps with their prices, index-aligned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesFrame {
    pub name: String,
    pub label: String,
    pub times: Vec<DateTime<Utc>>,
    pub prices: Vec<i32>,
}

impl SeriesFrame {
    pub fn from_points<I>(label: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let points = points.into_iter();
        let (lower, _) = points.size_hint();
        let mut times = Vec::with_capacity(lower);
        let mut prices = Vec::with_capacity(lower);
        for point in points {
            times.push(point.timestamp);
            prices.push(point.price);
        }

        Self {
            name: FRAME_NAME.to_string(),
            label: label.into(),
            times,
            prices,
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Outcome of one query.
pub type QueryResult = Result<SeriesFrame, QueryError>;

/// Results of a batch, keyed by RefID.
#[derive(Debug, Default)]
pub struct QueryResponse {
    results: HashMap<String, QueryResult>,
}

impl QueryResponse {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            results: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, ref_id: String, result: QueryResult) {
        self.results.insert(ref_id, result);
    }

    pub fn get(&self, ref_id: &str) -> Option<&QueryResult> {
        self.results.get(ref_id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryResult)> {
        self.results.iter()
    }

    pub fn into_inner(self) -> HashMap<String, QueryResult> {
        self.results
    }
}
