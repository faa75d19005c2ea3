//! CourtListener API client.

use crate::api::*;
use crate::config::{ClientConfig, RateLimitConfig, COURTLISTENER_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Resources that can be fetched by id.
pub const RECORD_RESOURCES: &[&str] = &["opinions", "dockets", "courts", "people", "clusters", "audio"];

/// Client for the CourtListener REST API v4.
#[derive(Debug, Clone)]
pub struct CourtListenerClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl CourtListenerClient {
    /// Create a new client builder.
    pub fn builder() -> CourtListenerClientBuilder {
        CourtListenerClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Fail with `Config` unless an API key is configured.
    pub fn require_api_key(&self) -> Result<()> {
        if self.has_api_key() {
            Ok(())
        } else {
            Err(Error::Config(
                "COURTLISTENER_API_KEY is not set; CourtListener requests need an API token"
                    .to_string(),
            ))
        }
    }

    /// Get the search API.
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    /// Get the opinions API.
    pub fn opinions(&self) -> OpinionsApi<'_> {
        OpinionsApi::new(self)
    }

    /// Get the dockets API.
    pub fn dockets(&self) -> DocketsApi<'_> {
        DocketsApi::new(self)
    }

    /// Get the audio API.
    pub fn audio(&self) -> AudioApi<'_> {
        AudioApi::new(self)
    }

    /// Get the clusters API.
    pub fn clusters(&self) -> ClustersApi<'_> {
        ClustersApi::new(self)
    }

    /// Get the people API.
    pub fn people(&self) -> PeopleApi<'_> {
        PeopleApi::new(self)
    }

    /// Get the courts API.
    pub fn courts(&self) -> CourtsApi<'_> {
        CourtsApi::new(self)
    }

    /// Get the citation lookup API.
    pub fn citations(&self) -> CitationsApi<'_> {
        CitationsApi::new(self)
    }

    pub(crate) async fn get_record<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: impl Display,
    ) -> Result<T> {
        self.require_api_key()?;
        let path = format!("{}/{}/", resource, id);
        debug!(resource, "Fetching record");
        self.http.get_json(&path, &[] as &[(&str, &str)]).await
    }

    /// Fetch any record resource as untyped JSON.
    pub async fn get_raw(&self, resource: &str, id: &str) -> Result<Value> {
        if !RECORD_RESOURCES.contains(&resource) {
            return Err(Error::NotFound(format!("unknown resource type: {}", resource)));
        }
        let id = id.trim();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
            return Err(Error::InvalidInput(format!("invalid {} id: {:?}", resource, id)));
        }
        self.get_record(resource, id).await
    }
}

/// Builder for creating a CourtListenerClient.
pub struct CourtListenerClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
}

impl CourtListenerClientBuilder {
    /// Create a new builder pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: COURTLISTENER_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API token. Blank keys are treated as absent.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key.trim().to_string())
        };
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CourtListenerClient> {
        let mut config = ClientConfig::parse(&self.base_url)?;
        config.api_key = self.api_key;
        config.timeout = self.timeout;
        config.rate_limit = self.rate_limit;

        CourtListenerClient::from_config(config)
    }
}

impl Default for CourtListenerClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> CourtListenerClient {
        CourtListenerClient::builder()
            .base_url(server.uri())
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = CourtListenerClient::builder().build().unwrap();
        assert_eq!(client.base_url(), COURTLISTENER_BASE_URL);
        assert!(!client.has_api_key());
        assert!(matches!(client.require_api_key(), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let client = CourtListenerClient::builder().api_key("  ").build().unwrap();
        assert!(!client.has_api_key());
    }

    #[tokio::test]
    async fn test_get_opinion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opinions/108713/"))
            .and(header("Authorization", "Token test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 108713,
                "type": "010combined",
                "plain_text": "Opinion text",
                "opinions_cited": [],
                "resource_uri": "https://www.courtlistener.com/api/rest/v4/opinions/108713/"
            })))
            .mount(&server)
            .await;

        let opinion = client(&server).await.opinions().get(108713).await.unwrap();
        assert_eq!(opinion.id, 108713);
        assert_eq!(opinion.opinion_type.as_deref(), Some("010combined"));
        assert!(opinion.extra.contains_key("resource_uri"));
    }

    #[tokio::test]
    async fn test_get_court_and_person() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/courts/scotus/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "scotus",
                "full_name": "Supreme Court of the United States"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/people/1213/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1213,
                "name_first": "Ruth",
                "name_middle": "Bader",
                "name_last": "Ginsburg"
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let court = client.courts().get("scotus").await.unwrap();
        assert_eq!(court.full_name.as_deref(), Some("Supreme Court of the United States"));

        let person = client.people().get(1213).await.unwrap();
        assert_eq!(person.full_name(), "Ruth Bader Ginsburg");
    }

    #[tokio::test]
    async fn test_missing_id_field_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/dockets/5/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"case_name": "X"})))
            .mount(&server)
            .await;

        let err = client(&server).await.dockets().get(5).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_raw_validates_resource() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clusters/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert_eq!(client.get_raw("clusters", "42").await.unwrap()["id"], 42);
        assert!(matches!(
            client.get_raw("secrets", "1").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            client.get_raw("opinions", "../1").await,
            Err(Error::InvalidInput(_))
        ));
    }
}
