use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use gegraph_market_data::Item;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::SearchItemsRequest,
};

/// Item search for the query editor.
///
/// An unreadable body is a server error here, as the editor expects.
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchItemsRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Item>>> {
    let Json(body) = body.map_err(|rejection| ApiError::Internal(rejection.body_text()))?;
    tracing::debug!("Searching for '{}'", body.query);

    let items = state.catalog.search(&body.query)?;
    Ok(Json(items))
}
