use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use gegraph_core::DataQuery;
use gegraph_market_data::cancel_pair;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{QueryRequest, QueryResponseDto},
};

/// Resolve a batch of queries.
///
/// The batch is cancelled once the configured deadline passes; queries still
/// outstanding then report a cancellation error for their RefID.
pub async fn query_data(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponseDto>> {
    let Json(body) = body?;
    let batch: Vec<DataQuery> = body.queries.into_iter().map(DataQuery::from).collect();
    tracing::debug!("Resolving batch of {} queries", batch.len());

    let (handle, token) = cancel_pair();
    let deadline = handle.cancel_after(state.query_deadline);
    let response = state.engine.resolve(batch, token).await;
    deadline.abort();

    Ok(Json(QueryResponseDto::from(response)))
}
