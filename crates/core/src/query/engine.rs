//! Concurrent resolution of a query batch.
//!
//! Each decodable query runs as its own task. A task checks the cache, falls
//! back to the retrying fetcher on a miss, caches what it fetched and filters
//! the graph to the query's time range. Failures stay attached to their
//! RefID; one query failing, panicking or being cancelled leaves the others
//! untouched.

use std::sync::Arc;

use gegraph_market_data::{CancelToken, ItemCatalog, ItemId, RetryingFetcher};
use log::{debug, error, warn};
use tokio::task::JoinSet;

use super::frame::{QueryResponse, QueryResult, SeriesFrame, DEFAULT_SERIES_LABEL};
use super::model::{DataQuery, ParsedQuery};
use crate::cache::AdaptiveCache;
use crate::errors::QueryError;

/// Resolves query batches against the shared cache and upstream fetcher.
///
/// Cheap to clone; clones share the cache, fetcher and catalog.
#[derive(Clone)]
pub struct QueryEngine {
    cache: Arc<AdaptiveCache>,
    fetcher: Arc<RetryingFetcher>,
    catalog: Option<Arc<dyn ItemCatalog>>,
}

impl QueryEngine {
    pub fn new(cache: Arc<AdaptiveCache>, fetcher: Arc<RetryingFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            catalog: None,
        }
    }

    /// Label series with item names from `catalog`.
    pub fn with_catalog(mut self, catalog: Arc<dyn ItemCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn cache(&self) -> &Arc<AdaptiveCache> {
        &self.cache
    }

    /// Resolve every query of `batch`.
    ///
    /// The response holds exactly one entry per distinct RefID. Once `cancel`
    /// fires, outstanding queries finish with [`QueryError::Cancelled`].
    /// Dropping the returned future aborts every task it spawned.
    pub async fn resolve(&self, batch: Vec<DataQuery>, cancel: CancelToken) -> QueryResponse {
        let mut response = QueryResponse::with_capacity(batch.len());
        let mut tasks = JoinSet::new();

        for query in batch {
            let parsed = match ParsedQuery::decode(&query) {
                Ok(parsed) => parsed,
                Err(err) => {
                    debug!("Query '{}' rejected: {}", query.ref_id, err);
                    response.insert(query.ref_id, Err(err));
                    continue;
                }
            };

            // Stays in place if the task dies before reporting back.
            response.insert(
                query.ref_id.clone(),
                Err(QueryError::Internal(format!(
                    "query '{}' did not complete",
                    query.ref_id
                ))),
            );

            let engine = self.clone();
            let cancel = cancel.clone();
            let ref_id = query.ref_id;
            tasks.spawn(async move {
                let result = engine.resolve_one(parsed, &cancel).await;
                (ref_id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((ref_id, result)) => {
                    if let Err(err) = &result {
                        warn!("Query '{}' failed: {}", ref_id, err);
                    }
                    response.insert(ref_id, result);
                }
                Err(err) => error!("Query task aborted: {}", err),
            }
        }

        response
    }

    async fn resolve_one(&self, query: ParsedQuery, cancel: &CancelToken) -> QueryResult {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }

        let store = match self.cache.get(query.item_id) {
            Some(store) => {
                debug!("Cache hit for item {}", query.item_id);
                store
            }
            None => {
                debug!("Cache miss for item {}, fetching", query.item_id);
                let fetched = self.fetcher.fetch(query.item_id, cancel).await?;
                self.cache.put(query.item_id, fetched)
            }
        };

        Ok(SeriesFrame::from_points(
            self.series_label(query.item_id),
            store.filter_sorted(&query.time_range),
        ))
    }

    fn series_label(&self, item_id: ItemId) -> String {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.lookup(item_id).ok())
            .map(|item| item.name)
            .unwrap_or_else(|| DEFAULT_SERIES_LABEL.to_string())
    }
}
