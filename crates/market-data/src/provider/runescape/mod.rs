//! RuneScape Grand Exchange graph source.
//!
//! Fetches the 180-day daily price graph of an item from the Grand Exchange
//! item database API. The API publishes at most one new point per UTC day,
//! at an unpredictable hour, and throttles aggressive clients.

mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;

use crate::errors::MarketDataError;
use crate::models::{ItemId, SeriesStore};
use crate::provider::{PriceSource, RateLimit};

use models::GraphResponse;

/// Provider ID constant
const PROVIDER_ID: &str = "RUNESCAPE_GE";

/// Default graph API base URL
pub const DEFAULT_BASE_URL: &str = "https://secure.runescape.com/m=itemdb_rs/api/graph";

/// The API rejects requests without a browser-like user agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:82.0) Gecko/20100101 Firefox/82.0";

/// Configuration for [`RuneScapeGraphSource`].
#[derive(Clone, Debug)]
pub struct RuneScapeGraphSourceConfig {
    /// Base URL; the item id and `.json` are appended
    pub base_url: String,
    /// User-Agent header sent with each request
    pub user_agent: String,
    /// Rate limit advertised to the fetcher
    pub rate_limit: RateLimit,
}

impl Default for RuneScapeGraphSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: RateLimit::default(),
        }
    }
}

/// Price source backed by the Grand Exchange graph API.
///
/// # Example
///
/// ```ignore
/// use gegraph_market_data::provider::RuneScapeGraphSource;
///
/// let source = RuneScapeGraphSource::new(Default::default())?;
/// let graph = source.fetch_graph(ItemId(4151)).await?;
/// ```
pub struct RuneScapeGraphSource {
    client: Client,
    config: RuneScapeGraphSourceConfig,
}

impl RuneScapeGraphSource {
    /// Create a new source with the given configuration.
    ///
    /// Fails when the HTTP client cannot be initialised.
    pub fn new(config: RuneScapeGraphSourceConfig) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(config.rate_limit.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn graph_url(&self, item_id: ItemId) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            item_id
        )
    }

    /// Convert a decoded graph response into a series.
    ///
    /// Keys that are not epoch milliseconds are skipped.
    fn parse_graph(item_id: ItemId, response: GraphResponse) -> Result<SeriesStore, MarketDataError> {
        let mut store = SeriesStore::new(item_id);

        for (key, price) in response.daily {
            match parse_epoch_millis(&key) {
                Some(timestamp) => {
                    store.insert(timestamp, price);
                }
                None => warn!(
                    "Skipping unparseable timestamp '{}' in graph for item {}",
                    key, item_id
                ),
            }
        }

        if store.is_empty() {
            return Err(MarketDataError::EmptyGraph(item_id));
        }

        Ok(store)
    }
}

fn parse_epoch_millis(key: &str) -> Option<DateTime<Utc>> {
    key.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

#[async_trait]
impl PriceSource for RuneScapeGraphSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        self.config.rate_limit.clone()
    }

    async fn fetch_graph(&self, item_id: ItemId) -> Result<SeriesStore, MarketDataError> {
        let url = self.graph_url(item_id);
        debug!("Fetching price graph for item {} from {}", item_id, url);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Upstream {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        // The API answers unknown items with an empty 200 body
        let body = response.bytes().await?;
        let graph: GraphResponse =
            serde_json::from_slice(&body).map_err(|e| MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        Self::parse_graph(item_id, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "daily": {
            "1609718400000": 2500000,
            "1609804800000": 2512345,
            "1609632000000": 2490000
        },
        "average": {
            "1609718400000": 2480000
        }
    }"#;

    #[test]
    fn test_provider_id() {
        let source = RuneScapeGraphSource::new(RuneScapeGraphSourceConfig::default()).unwrap();
        assert_eq!(source.id(), "RUNESCAPE_GE");
    }

    #[test]
    fn test_new_keeps_configured_client_settings() {
        let config = RuneScapeGraphSourceConfig {
            user_agent: "test-agent/1.0".to_string(),
            ..Default::default()
        };
        let source = RuneScapeGraphSource::new(config).unwrap();
        assert_eq!(source.config.user_agent, "test-agent/1.0");
        assert_eq!(
            source.config.rate_limit.request_timeout,
            RateLimit::default().request_timeout
        );
    }

    #[test]
    fn test_graph_url() {
        let source = RuneScapeGraphSource::new(RuneScapeGraphSourceConfig {
            base_url: "http://localhost:9000/graph/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            source.graph_url(ItemId(4151)),
            "http://localhost:9000/graph/4151.json"
        );
    }

    #[test]
    fn test_parse_graph_uses_daily_points() {
        let response: GraphResponse = serde_json::from_str(FIXTURE).unwrap();
        let store = RuneScapeGraphSource::parse_graph(ItemId(4151), response).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.item_id(), ItemId(4151));
        assert_eq!(
            store.latest_timestamp(),
            Some(Utc.with_ymd_and_hms(2021, 1, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(store.latest().map(|p| p.price), Some(2512345));
    }

    #[test]
    fn test_parse_graph_skips_bad_keys() {
        let response: GraphResponse =
            serde_json::from_str(r#"{"daily": {"yesterday": 1, "1609804800000": 2}}"#).unwrap();
        let store = RuneScapeGraphSource::parse_graph(ItemId(1), response).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parse_graph_empty_is_error() {
        let response: GraphResponse = serde_json::from_str(r#"{"daily": {}}"#).unwrap();
        let result = RuneScapeGraphSource::parse_graph(ItemId(7), response);
        assert!(matches!(result, Err(MarketDataError::EmptyGraph(ItemId(7)))));
    }
}
