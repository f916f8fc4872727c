use std::sync::Arc;

use axum::{extract::State, Json};
use gegraph_core::CacheStats;

use crate::{error::ApiResult, main_lib::AppState};

pub async fn cache_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<CacheStats>> {
    Ok(Json(state.cache.stats()))
}
