use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use gegraph_market_data::provider::runescape::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub itemdb_path: String,
    pub upstream_url: String,
    pub user_agent: String,
    pub cache_max_bytes: u64,
    pub stale_ttl: Duration,
    pub fetch_max_retries: u32,
    pub fetch_retry_delay: Duration,
    pub upstream_rpm: u32,
    pub query_deadline: Duration,
    pub request_timeout: Duration,
    pub cors_allow: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let cors_allow = std::env::var("GE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr: env_or("GE_LISTEN_ADDR", defaults.listen_addr)?,
            itemdb_path: std::env::var("GE_ITEMDB_PATH").unwrap_or(defaults.itemdb_path),
            upstream_url: std::env::var("GE_UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            user_agent: std::env::var("GE_USER_AGENT").unwrap_or(defaults.user_agent),
            cache_max_bytes: env_or("GE_CACHE_MAX_BYTES", defaults.cache_max_bytes)?,
            stale_ttl: Duration::from_secs(env_or(
                "GE_STALE_TTL_SECS",
                defaults.stale_ttl.as_secs(),
            )?),
            fetch_max_retries: env_or("GE_FETCH_MAX_RETRIES", defaults.fetch_max_retries)?,
            fetch_retry_delay: millis_or("GE_FETCH_RETRY_DELAY_MS", defaults.fetch_retry_delay)?,
            upstream_rpm: env_or("GE_UPSTREAM_RPM", defaults.upstream_rpm)?,
            query_deadline: millis_or("GE_QUERY_DEADLINE_MS", defaults.query_deadline)?,
            request_timeout: millis_or("GE_REQUEST_TIMEOUT_MS", defaults.request_timeout)?,
            cors_allow,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            itemdb_path: "/data/itemdb.ljson".into(),
            upstream_url: DEFAULT_BASE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            cache_max_bytes: gegraph_core::cache::DEFAULT_MAX_COST,
            stale_ttl: gegraph_core::cache::DEFAULT_STALE_TTL,
            fetch_max_retries: gegraph_market_data::registry::DEFAULT_MAX_RETRIES,
            fetch_retry_delay: gegraph_market_data::registry::DEFAULT_RETRY_DELAY,
            upstream_rpm: 60,
            query_deadline: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
            cors_allow: vec!["*".into()],
        }
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Like [`env_or`], for durations given in milliseconds.
fn millis_or(key: &str, default: Duration) -> anyhow::Result<Duration> {
    let default = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    env_or(key, default).map(Duration::from_millis)
}
