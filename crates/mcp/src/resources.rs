//! `courtlistener://` resource templates.
//!
//! Each template maps onto one CourtListener record endpoint; reading a
//! resource returns the record as pretty-printed JSON.

use crate::error::McpError;
use crate::protocol::{ReadResourceResult, ResourceContents, ResourceTemplate};
use courtlistener_sdk::client::RECORD_RESOURCES;
use courtlistener_sdk::{CourtListenerClient, Error};
use tracing::info;

pub const SCHEME: &str = "courtlistener://";
const MIME_JSON: &str = "application/json";

/// (resource, display name, description)
const TEMPLATES: &[(&str, &str, &str)] = &[
    ("opinions", "Opinion", "A court opinion with its full text"),
    ("dockets", "Docket", "A docket (case) record"),
    ("courts", "Court", "A court, identified by its slug such as 'scotus'"),
    ("people", "Person", "A judge or other legal professional"),
    ("clusters", "Opinion Cluster", "An opinion cluster: case, citations and opinions"),
    ("audio", "Oral Argument", "An oral argument audio recording"),
];

pub fn templates() -> Vec<ResourceTemplate> {
    TEMPLATES
        .iter()
        .map(|(resource, name, description)| ResourceTemplate {
            uri_template: format!("{}{}/{{id}}", SCHEME, resource),
            name: name.to_string(),
            description: description.to_string(),
            mime_type: MIME_JSON.to_string(),
        })
        .collect()
}

/// Split `courtlistener://{resource}/{id}`.
pub fn parse_uri(uri: &str) -> Result<(&str, &str), McpError> {
    let not_found = || McpError::ResourceNotFound(uri.to_string());
    let rest = uri.strip_prefix(SCHEME).ok_or_else(not_found)?;
    let (resource, id) = rest.split_once('/').ok_or_else(not_found)?;
    let id = id.trim_end_matches('/');
    if !RECORD_RESOURCES.contains(&resource) || id.is_empty() || id.contains('/') {
        return Err(not_found());
    }
    Ok((resource, id))
}

/// Fetch the record behind a resource URI.
pub async fn read(client: &CourtListenerClient, uri: &str) -> Result<ReadResourceResult, McpError> {
    let (resource, id) = parse_uri(uri)?;
    info!(resource, id, "Reading resource");

    let record = client.get_raw(resource, id).await.map_err(|e| match e {
        Error::InvalidInput(message) => McpError::InvalidParams(message),
        Error::NotFound(_) => McpError::ResourceNotFound(uri.to_string()),
        other => McpError::Upstream(other),
    })?;
    let text = serde_json::to_string_pretty(&record)?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: MIME_JSON.to_string(),
            text,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_templates() {
        let uris: Vec<String> = templates().into_iter().map(|t| t.uri_template).collect();
        assert_eq!(uris.len(), 6);
        assert!(uris.contains(&"courtlistener://opinions/{id}".to_string()));
        assert!(uris.contains(&"courtlistener://audio/{id}".to_string()));
    }

    #[test]
    fn test_parse_uri() {
        assert_eq!(
            parse_uri("courtlistener://courts/scotus").unwrap(),
            ("courts", "scotus")
        );
        assert_eq!(
            parse_uri("courtlistener://opinions/108713/").unwrap(),
            ("opinions", "108713")
        );
        for bad in [
            "https://www.courtlistener.com/opinions/1",
            "courtlistener://secrets/1",
            "courtlistener://opinions/",
            "courtlistener://opinions/1/2",
            "courtlistener://opinions",
        ] {
            assert!(matches!(parse_uri(bad), Err(McpError::ResourceNotFound(_))), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dockets/4214664/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 4214664,
                "case_name": "Oracle America, Inc. v. Google LLC"
            })))
            .mount(&server)
            .await;

        let client = CourtListenerClient::builder()
            .base_url(server.uri())
            .api_key("test-key")
            .build()
            .unwrap();
        let result = read(&client, "courtlistener://dockets/4214664").await.unwrap();

        let contents = &result.contents[0];
        assert_eq!(contents.mime_type, "application/json");
        assert_eq!(contents.uri, "courtlistener://dockets/4214664");
        assert!(contents.text.contains("Oracle America"));
    }
}
