//! Rate limiting configuration for price sources.

use std::time::Duration;

/// Rate limiting configuration for a price source.
///
/// Controls how aggressively we can call the upstream to avoid
/// hitting its rate limits and getting blocked.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Number of requests that may be issued back to back.
    pub burst: u32,

    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}
