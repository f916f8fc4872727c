//! Query payload decoding.
//!
//! A query arrives as an opaque JSON object plus the host's time range; both
//! are decoded per query so a malformed one fails only its own RefID. The
//! item may be named under `itemId` (numeric) or the legacy `itemID`, which
//! older dashboards saved either as a number or as a numeric string.

use gegraph_market_data::{ItemId, TimeRange};
use serde::Deserialize;

use crate::errors::{QueryError, Result};

/// Time range of a query, either already typed or still as host JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryTimeRange {
    Decoded(TimeRange),
    Raw(serde_json::Value),
}

impl QueryTimeRange {
    fn decode(&self) -> Result<TimeRange> {
        match self {
            QueryTimeRange::Decoded(range) => Ok(*range),
            QueryTimeRange::Raw(value) => TimeRange::deserialize(value)
                .map_err(|e| QueryError::Decode(format!("invalid timeRange: {}", e))),
        }
    }
}

/// One query of a batch, as delivered by the host.
#[derive(Clone, Debug)]
pub struct DataQuery {
    pub ref_id: String,
    pub time_range: QueryTimeRange,
    /// Raw query model JSON.
    pub json: Vec<u8>,
}

impl DataQuery {
    pub fn new(ref_id: impl Into<String>, time_range: TimeRange, json: impl Into<Vec<u8>>) -> Self {
        Self {
            ref_id: ref_id.into(),
            time_range: QueryTimeRange::Decoded(time_range),
            json: json.into(),
        }
    }

    /// A query whose time range is decoded along with its model.
    pub fn with_raw_time_range(
        ref_id: impl Into<String>,
        time_range: serde_json::Value,
        json: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            time_range: QueryTimeRange::Raw(time_range),
            json: json.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyItemId {
    Number(i64),
    Text(String),
}

/// Decoded query model.
#[derive(Debug, Default, Deserialize)]
pub struct QueryModel {
    #[serde(default, rename = "itemId")]
    item_id: Option<i64>,
    #[serde(default, rename = "itemID")]
    legacy_item_id: Option<LegacyItemId>,
}

impl QueryModel {
    pub fn decode(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// The requested item. `itemId` wins over `itemID`.
    pub fn item_id(&self) -> Result<ItemId> {
        let raw = match (&self.item_id, &self.legacy_item_id) {
            (Some(id), _) => *id,
            (None, Some(LegacyItemId::Number(id))) => *id,
            (None, Some(LegacyItemId::Text(text))) => text.trim().parse::<i64>().map_err(|_| {
                QueryError::Decode(format!("itemID '{}' is not a number", text))
            })?,
            (None, None) => return Err(QueryError::Decode("missing item id".to_string())),
        };

        let item_id = ItemId(raw);
        if !item_id.is_valid() {
            return Err(QueryError::Decode(format!(
                "item id {} must not be negative",
                raw
            )));
        }
        Ok(item_id)
    }
}

/// A query that passed decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedQuery {
    pub item_id: ItemId,
    pub time_range: TimeRange,
}

impl ParsedQuery {
    pub fn decode(query: &DataQuery) -> Result<Self> {
        let item_id = QueryModel::decode(&query.json)?.item_id()?;
        let time_range = query.time_range.decode()?;

        if time_range.from > time_range.to {
            return Err(QueryError::Decode(format!(
                "time range starts after it ends ({} > {})",
                time_range.from, time_range.to
            )));
        }

        Ok(Self {
            item_id,
            time_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn range() -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap(),
        )
    }

    fn decode(json: &str) -> Result<ItemId> {
        QueryModel::decode(json.as_bytes())?.item_id()
    }

    #[test]
    fn test_item_id_field() {
        assert_eq!(decode(r#"{"itemId": 4151}"#).unwrap(), ItemId(4151));
    }

    #[test]
    fn test_legacy_field_number_and_string() {
        assert_eq!(decode(r#"{"itemID": 4151}"#).unwrap(), ItemId(4151));
        assert_eq!(decode(r#"{"itemID": " 4151 "}"#).unwrap(), ItemId(4151));
    }

    #[test]
    fn test_item_id_wins_over_legacy() {
        assert_eq!(
            decode(r#"{"itemId": 1, "itemID": "2"}"#).unwrap(),
            ItemId(1)
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        assert_eq!(
            decode(r#"{"itemId": 7, "refId": "A", "hide": false}"#).unwrap(),
            ItemId(7)
        );
    }

    #[test]
    fn test_rejects_bad_payloads() {
        for json in [
            "",
            "not json",
            "{}",
            r#"{"itemId": "abc"}"#,
            r#"{"itemId": 1.5}"#,
            r#"{"itemID": "abc"}"#,
            r#"{"itemId": -1}"#,
        ] {
            let err = decode(json).unwrap_err();
            assert!(matches!(err, QueryError::Decode(_)), "accepted {json:?}");
        }
    }

    #[test]
    fn test_raw_time_range_is_decoded() {
        let query = DataQuery::with_raw_time_range(
            "A",
            serde_json::json!({"from": "2021-01-01T00:00:00Z", "to": "2021-02-01T00:00:00Z"}),
            r#"{"itemId": 1}"#,
        );
        assert_eq!(ParsedQuery::decode(&query).unwrap().time_range, range());
    }

    #[test]
    fn test_bad_raw_time_range_is_a_decode_error() {
        for raw in [
            serde_json::json!({"from": "garbage", "to": "2021-02-01T00:00:00Z"}),
            serde_json::json!({"from": "2021-01-01T00:00:00Z"}),
            serde_json::Value::Null,
        ] {
            let query = DataQuery::with_raw_time_range("B", raw.clone(), r#"{"itemId": 1}"#);
            let err = ParsedQuery::decode(&query).unwrap_err();
            assert!(
                matches!(err, QueryError::Decode(ref msg) if msg.contains("timeRange")),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut time_range = range();
        std::mem::swap(&mut time_range.from, &mut time_range.to);
        let query = DataQuery::new("A", time_range, r#"{"itemId": 1}"#);
        assert!(matches!(
            ParsedQuery::decode(&query),
            Err(QueryError::Decode(_))
        ));
    }

    #[test]
    fn test_parsed_query() {
        let query = DataQuery::new("A", range(), r#"{"itemId": 1}"#);
        let parsed = ParsedQuery::decode(&query).unwrap();
        assert_eq!(parsed.item_id, ItemId(1));
        assert_eq!(parsed.time_range, range());
    }
}
