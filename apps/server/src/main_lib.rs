use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gegraph_core::{AdaptiveCache, CacheConfig, QueryEngine};
use gegraph_market_data::{
    ItemCatalog, ItemDb, PriceSource, RateLimit, RetryPolicy, RetryingFetcher,
    RuneScapeGraphSource, RuneScapeGraphSourceConfig,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub engine: QueryEngine,
    pub catalog: Arc<dyn ItemCatalog>,
    pub cache: Arc<AdaptiveCache>,
    pub query_deadline: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("GE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build the state against the RuneScape graph API.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let source = RuneScapeGraphSource::new(RuneScapeGraphSourceConfig {
        base_url: config.upstream_url.clone(),
        user_agent: config.user_agent.clone(),
        rate_limit: RateLimit {
            requests_per_minute: config.upstream_rpm,
            ..Default::default()
        },
    })
    .context("Failed to build upstream HTTP client")?;

    build_state_with_source(config, Arc::new(source)).await
}

/// Build the state around an arbitrary price source.
pub async fn build_state_with_source(
    config: &Config,
    source: Arc<dyn PriceSource>,
) -> anyhow::Result<Arc<AppState>> {
    let itemdb_path = config.itemdb_path.clone();
    let catalog = tokio::task::spawn_blocking(move || ItemDb::open(&itemdb_path))
        .await
        .context("Item database loader panicked")?
        .with_context(|| format!("Failed to load item database {}", config.itemdb_path))?;
    tracing::info!(
        "Item database {} loaded with {} items",
        config.itemdb_path,
        catalog.len()
    );
    let catalog: Arc<dyn ItemCatalog> = Arc::new(catalog);

    let cache = Arc::new(AdaptiveCache::new(CacheConfig {
        max_cost: config.cache_max_bytes,
        stale_ttl: config.stale_ttl,
    }));

    let fetcher = Arc::new(RetryingFetcher::with_policy(
        source,
        RetryPolicy {
            max_retries: config.fetch_max_retries,
            delay: config.fetch_retry_delay,
        },
    ));
    tracing::info!(
        "Upstream '{}' with {} attempt(s) per fetch, cache budget {} bytes",
        fetcher.source_id(),
        fetcher.policy().max_attempts(),
        config.cache_max_bytes
    );

    let engine = QueryEngine::new(Arc::clone(&cache), fetcher).with_catalog(Arc::clone(&catalog));

    Ok(Arc::new(AppState {
        engine,
        catalog,
        cache,
        query_deadline: config.query_deadline,
    }))
}
