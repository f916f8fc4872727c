use std::collections::btree_map::{self, BTreeMap};
use std::iter::FusedIterator;
use std::ops::Bound;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// A single price observation as handed to callers.
///
/// Prices are narrowed to `i32` on output; the upstream graph carries the
/// same precision, so larger values never occur in practice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: i32,
}

impl PricePoint {
    /// Build an output point from a stored raw price (truncating cast).
    pub fn from_raw(timestamp: DateTime<Utc>, price: i64) -> Self {
        Self {
            timestamp,
            price: price as i32,
        }
    }
}

/// Time window `[from, to)` requested by a query.
///
/// Filtering treats both ends as exclusive, see [`SeriesStore::filter_sorted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Whether `timestamp` lies strictly between `from` and `to`.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from < timestamp && timestamp < self.to
    }
}

/// Price history for exactly one item.
///
/// Timestamps are unique keys; writing a price for an existing timestamp
/// replaces it. Once inserted into the cache a store is shared as an
/// immutable snapshot and never mutated again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesStore {
    item_id: ItemId,
    points: BTreeMap<DateTime<Utc>, i64>,
}

impl SeriesStore {
    /// Create an empty store for `item_id`.
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            points: BTreeMap::new(),
        }
    }

    /// Create a store from `(timestamp, price)` pairs. Later duplicates win.
    pub fn from_points<I>(item_id: ItemId, points: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, i64)>,
    {
        let mut store = Self::new(item_id);
        for (timestamp, price) in points {
            store.insert(timestamp, price);
        }
        store
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Insert or overwrite the price at `timestamp`, returning the old price.
    pub fn insert(&mut self, timestamp: DateTime<Utc>, price: i64) -> Option<i64> {
        self.points.insert(timestamp, price)
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<i64> {
        self.points.get(timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamp of the most recent observation.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.keys().next_back().copied()
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<PricePoint> {
        self.points
            .iter()
            .next_back()
            .map(|(timestamp, price)| PricePoint::from_raw(*timestamp, *price))
    }

    /// All observations in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.points
            .iter()
            .map(|(timestamp, price)| PricePoint::from_raw(*timestamp, *price))
    }

    /// Observations with `range.from < timestamp < range.to`, ascending.
    ///
    /// The returned iterator is lazy and can be cloned to restart the walk.
    /// An empty or inverted range yields nothing.
    pub fn filter_sorted(&self, range: &TimeRange) -> FilterSorted<'_> {
        let inner = (range.from < range.to).then(|| {
            self.points
                .range((Bound::Excluded(range.from), Bound::Excluded(range.to)))
        });
        FilterSorted { inner }
    }
}

/// Iterator returned by [`SeriesStore::filter_sorted`].
#[derive(Clone, Debug)]
pub struct FilterSorted<'a> {
    inner: Option<btree_map::Range<'a, DateTime<Utc>, i64>>,
}

impl Iterator for FilterSorted<'_> {
    type Item = PricePoint;

    fn next(&mut self) -> Option<PricePoint> {
        let (timestamp, price) = self.inner.as_mut()?.next()?;
        Some(PricePoint::from_raw(*timestamp, *price))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(range) => range.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for FilterSorted<'_> {}
