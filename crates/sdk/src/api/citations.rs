//! Citation lookup API (`POST citation-lookup/`).

use crate::client::CourtListenerClient;
use crate::error::{Error, Result};
use courtlistener_core::CitationLookupResult;
use std::time::Duration;
use tracing::info;

/// Most citations accepted in one batch.
pub const MAX_BATCH: usize = 100;

/// Batch lookups send more text and get a longer deadline.
pub const BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Citation lookup API.
pub struct CitationsApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> CitationsApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    /// Resolve every citation found in `text` to opinion clusters.
    pub async fn lookup(&self, text: &str) -> Result<Vec<CitationLookupResult>> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("citation text is empty".to_string()));
        }
        self.client.require_api_key()?;

        let results: Vec<CitationLookupResult> = self
            .client
            .http
            .post_form("citation-lookup/", &[("text", text)], None)
            .await?;
        info!(
            found = results.iter().filter(|r| r.is_found()).count(),
            total = results.len(),
            "Citation lookup completed"
        );
        Ok(results)
    }

    /// Look up several citations in one request.
    pub async fn batch_lookup(&self, citations: &[String]) -> Result<Vec<CitationLookupResult>> {
        if citations.is_empty() || citations.len() > MAX_BATCH {
            return Err(Error::InvalidInput(format!(
                "between 1 and {} citations are required, got {}",
                MAX_BATCH,
                citations.len()
            )));
        }
        self.client.require_api_key()?;

        let text = citations.join(" ");
        self.client
            .http
            .post_form("citation-lookup/", &[("text", text.as_str())], Some(BATCH_TIMEOUT))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> CourtListenerClient {
        CourtListenerClient::builder()
            .base_url(server.uri())
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_parses_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/citation-lookup/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "citation": "410 U.S. 113",
                    "normalized_citations": ["410 U.S. 113"],
                    "start_index": 0,
                    "end_index": 12,
                    "status": 200,
                    "error_message": "",
                    "clusters": [{"id": 108713, "case_name": "Roe v. Wade"}]
                },
                {
                    "citation": "999 U.S. 999",
                    "normalized_citations": ["999 U.S. 999"],
                    "start_index": 13,
                    "end_index": 25,
                    "status": 404,
                    "error_message": "Citation not found",
                    "clusters": []
                }
            ])))
            .mount(&server)
            .await;

        let results = client(&server)
            .await
            .citations()
            .lookup("410 U.S. 113 999 U.S. 999")
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_found());
        assert!(!results[1].is_found());
    }

    #[tokio::test]
    async fn test_batch_joins_citations() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/citation-lookup/"))
            .and(body_string_contains("text=410+U.S.+113+347+U.S.+483"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let citations = vec!["410 U.S. 113".to_string(), "347 U.S. 483".to_string()];
        let results = client(&server)
            .await
            .citations()
            .batch_lookup(&citations)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_batch_bounds() {
        let server = MockServer::start().await;
        let client = client(&server).await;

        assert!(matches!(
            client.citations().batch_lookup(&[]).await,
            Err(Error::InvalidInput(_))
        ));

        let too_many = vec!["1 U.S. 1".to_string(); MAX_BATCH + 1];
        assert!(matches!(
            client.citations().batch_lookup(&too_many).await,
            Err(Error::InvalidInput(_))
        ));
    }
}
