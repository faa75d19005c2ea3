//! HTTP transport shared by the CourtListener and eCFR clients.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP transport for one upstream API.
///
/// Clones share the connection pool and the rate limiter.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
    limiter: Option<Arc<DirectLimiter>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.config.base_url.as_str())
            .field("timeout", &self.config.timeout)
            .field("rate_limit", &self.config.rate_limit)
            .finish()
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        if let Some(ref api_key) = config.api_key {
            let mut value = header::HeaderValue::from_str(&format!("Token {}", api_key))
                .map_err(|_| Error::Config("Invalid API key format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        let limiter = config
            .rate_limit
            .and_then(|limit| limit.quota())
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL for the given path, relative to the base URL.
    fn build_url(&self, path: &str) -> Result<url::Url> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Consume one unit of the request budget, failing fast when exhausted.
    fn acquire(&self) -> Result<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter.check().map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            warn!(wait_ms = wait.as_millis() as u64, "Client rate limit exhausted");
            Error::RateLimited {
                retry_after_secs: Some(wait.as_secs().max(1)),
            }
        })
    }

    /// Send a request and map transport failures and error statuses.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        self.acquire()?;

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Upstream request failed");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        Err(Error::from_response(status.as_u16(), &body))
    }

    async fn read_body(response: Response) -> Result<String> {
        response.text().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Http(e)
            }
        })
    }

    fn decode<T: DeserializeOwned>(body: &str, context: impl Into<String>) -> Result<T> {
        serde_json::from_str(body).map_err(|source| Error::Decode {
            context: context.into(),
            source,
        })
    }

    /// GET `path` with query parameters and decode the JSON body.
    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let body = self.get_text(path, query).await?;
        Self::decode(&body, format!("GET {}", path))
    }

    /// GET `path` with query parameters and return the raw body.
    pub async fn get_text<Q>(&self, path: &str, query: &Q) -> Result<String>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute(self.client.get(url).query(query)).await?;
        Self::read_body(response).await
    }

    /// POST an urlencoded form and decode the JSON body.
    ///
    /// `timeout` overrides the client timeout for this request.
    pub async fn post_form<T, F>(&self, path: &str, form: &F, timeout: Option<Duration>) -> Result<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST form request");

        let mut request = self.client.post(url).form(form);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = self.execute(request).await?;
        let body = Self::read_body(response).await?;
        Self::decode(&body, format!("POST {}", path))
    }
}
