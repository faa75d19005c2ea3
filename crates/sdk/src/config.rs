//! Configuration types for the upstream clients.

use crate::error::{Error, Result};
use governor::Quota;
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

/// Default CourtListener REST API root.
pub const COURTLISTENER_BASE_URL: &str = "https://www.courtlistener.com/api/rest/v4/";

/// Default eCFR API root.
pub const ECFR_BASE_URL: &str = "https://www.ecfr.gov/";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("courtlistener-mcp/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for an upstream client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; always ends with `/` so relative paths join below it.
    pub base_url: Url,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Client-side rate limit, if any.
    pub rate_limit: Option<RateLimitConfig>,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Parse `base_url` and create a configuration from it.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https: {}",
                base_url
            )));
        }
        Ok(Self::new(url))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Client-side request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    /// Requests allowed back to back before the per-minute rate applies.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst: 10,
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        Self {
            requests_per_minute,
            burst,
        }
    }

    /// Governor quota, or `None` when the limit is disabled (zero rate).
    pub fn quota(&self) -> Option<Quota> {
        let rate = NonZeroU32::new(self.requests_per_minute)?;
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        Some(Quota::per_minute(rate).allow_burst(burst))
    }
}
