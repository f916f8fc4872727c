//! Query batch handling
//!
//! - `model` - Decoding of the per-query JSON model
//! - `frame` - Result frames and the per-RefID response map
//! - `engine` - Concurrent fan-out over the cache and upstream fetcher

mod engine;
mod frame;
mod model;

pub use engine::QueryEngine;
pub use frame::{
    QueryResponse, QueryResult, SeriesFrame, DEFAULT_SERIES_LABEL, FRAME_NAME, TIME_FIELD,
};
pub use model::{DataQuery, ParsedQuery, QueryModel, QueryTimeRange};
