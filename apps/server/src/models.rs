//! Wire types of the host transport.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gegraph_core::{query::TIME_FIELD, DataQuery, QueryResponse, QueryResult, SeriesFrame};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub queries: Vec<QueryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDto {
    #[serde(default)]
    pub ref_id: String,
    /// Decoded per query by the engine, like the model.
    #[serde(default)]
    pub time_range: serde_json::Value,
    /// Query model, decoded per query by the engine.
    #[serde(default)]
    pub query: serde_json::Value,
}

impl From<QueryDto> for DataQuery {
    fn from(dto: QueryDto) -> Self {
        // a model that fails to re-encode surfaces as that query's decode error
        let json = serde_json::to_vec(&dto.query).unwrap_or_default();
        DataQuery::with_raw_time_range(dto.ref_id, dto.time_range, json)
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponseDto {
    pub results: BTreeMap<String, DataResponseDto>,
}

impl From<QueryResponse> for QueryResponseDto {
    fn from(response: QueryResponse) -> Self {
        let results = response
            .into_inner()
            .into_iter()
            .map(|(ref_id, result)| (ref_id, DataResponseDto::from(result)))
            .collect();
        Self { results }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponseDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<FrameDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl From<QueryResult> for DataResponseDto {
    fn from(result: QueryResult) -> Self {
        match result {
            Ok(frame) => Self {
                frames: Some(vec![FrameDto::from(frame)]),
                error: None,
                error_code: None,
            },
            Err(err) => Self {
                frames: None,
                error: Some(err.to_string()),
                error_code: Some(err.code()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FrameDto {
    pub name: String,
    pub fields: Vec<FieldDto>,
}

impl From<SeriesFrame> for FrameDto {
    fn from(frame: SeriesFrame) -> Self {
        Self {
            name: frame.name,
            fields: vec![
                FieldDto {
                    name: TIME_FIELD.to_string(),
                    values: FieldValues::Time(frame.times),
                },
                FieldDto {
                    name: frame.label,
                    values: FieldValues::Price(frame.prices),
                },
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldDto {
    pub name: String,
    pub values: FieldValues,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    Price(Vec<i32>),
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchItemsRequest {
    #[serde(default)]
    pub query: String,
}
