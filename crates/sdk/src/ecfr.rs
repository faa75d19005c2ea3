//! eCFR (Electronic Code of Federal Regulations) client.
//!
//! The eCFR API is public; no key is sent. Point-in-time endpoints take a
//! `YYYY-MM-DD` date, and when the caller has none the title's
//! `up_to_date_as_of` date from the versioner is used.

use crate::config::{ClientConfig, RateLimitConfig, DEFAULT_TIMEOUT, ECFR_BASE_URL};
use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use chrono::NaiveDate;
use courtlistener_core::regulation::{
    AgenciesResponse, AncestryResponse, RegulationSearchResponse, TitlesResponse,
    VersionsResponse,
};
use courtlistener_core::{xml, RegulationDocument, RegulationNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// CFR titles are numbered 1 through 50.
pub const MAX_TITLE: u32 = 50;

/// Position inside a title. Empty levels are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hierarchy {
    pub chapter: Option<String>,
    pub subchapter: Option<String>,
    pub part: Option<String>,
    pub subpart: Option<String>,
    pub section: Option<String>,
    pub appendix: Option<String>,
}

impl Hierarchy {
    /// Hierarchy for a section such as `1910.1200`; the part is the number
    /// before the dot.
    pub fn for_section(section: &str) -> Self {
        let section = section.trim().trim_start_matches('§').trim();
        let part = section.split('.').next().unwrap_or(section);
        Self {
            part: Some(part.to_string()),
            section: Some(section.to_string()),
            ..Default::default()
        }
    }

    /// Query pairs for the levels that are set.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("chapter", &self.chapter),
            ("subchapter", &self.subchapter),
            ("part", &self.part),
            ("subpart", &self.subpart),
            ("section", &self.section),
            ("appendix", &self.appendix),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }
}

/// Full-text regulation search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationSearch {
    pub query: String,
    pub title: Option<u32>,
    pub agency: Option<String>,
    pub date: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl RegulationSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("query", self.query.trim().to_string())];
        if let Some(title) = self.title {
            query.push(("hierarchy[title]", title.to_string()));
        }
        if let Some(agency) = self.agency.as_deref().filter(|a| !a.trim().is_empty()) {
            query.push(("agency_slugs[]", agency.trim().to_string()));
        }
        if let Some(date) = self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            query.push(("date", date.trim().to_string()));
        }
        query.push(("per_page", self.per_page.unwrap_or(20).to_string()));
        query.push(("page", self.page.unwrap_or(1).to_string()));
        query
    }
}

/// Client for the eCFR versioner, admin and search APIs.
#[derive(Debug, Clone)]
pub struct EcfrClient {
    http: HttpTransport,
}

impl EcfrClient {
    pub fn builder() -> EcfrClientBuilder {
        EcfrClientBuilder::new()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpTransport::new(Arc::new(config))?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.config().base_url.as_str()
    }

    /// All CFR titles with their currency dates.
    pub async fn titles(&self) -> Result<TitlesResponse> {
        self.http
            .get_json("api/versioner/v1/titles.json", &[] as &[(&str, &str)])
            .await
    }

    /// Agencies and the CFR chapters they administer.
    pub async fn agencies(&self) -> Result<AgenciesResponse> {
        self.http
            .get_json("api/admin/v1/agencies.json", &[] as &[(&str, &str)])
            .await
    }

    /// Date through which `title` is current.
    pub async fn latest_date(&self, title: u32) -> Result<String> {
        check_title(title)?;
        let titles = self.titles().await?;
        let entry = titles
            .title(title)
            .ok_or_else(|| Error::NotFound(format!("CFR title {} is not listed", title)))?;
        if entry.reserved {
            return Err(Error::NotFound(format!("CFR title {} is reserved", title)));
        }
        entry
            .up_to_date_as_of
            .clone()
            .ok_or_else(|| Error::NotFound(format!("CFR title {} has no current date", title)))
    }

    async fn resolve_date(&self, title: u32, date: Option<&str>) -> Result<String> {
        match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => {
                check_date(date)?;
                Ok(date.to_string())
            }
            None => {
                let date = self.latest_date(title).await?;
                debug!(title, date = %date, "Using latest available date");
                Ok(date)
            }
        }
    }

    /// Structure tree of a title (no text).
    pub async fn structure(&self, title: u32, date: Option<&str>) -> Result<RegulationNode> {
        check_title(title)?;
        let date = self.resolve_date(title, date).await?;
        let path = format!("api/versioner/v1/structure/{}/title-{}.json", date, title);
        self.http.get_json(&path, &[] as &[(&str, &str)]).await
    }

    /// Ancestors of a hierarchy position, from the title down.
    pub async fn ancestry(
        &self,
        title: u32,
        date: Option<&str>,
        hierarchy: &Hierarchy,
    ) -> Result<AncestryResponse> {
        check_title(title)?;
        let date = self.resolve_date(title, date).await?;
        let path = format!("api/versioner/v1/ancestry/{}/title-{}.json", date, title);
        self.http.get_json(&path, &hierarchy.to_query()).await
    }

    /// Amendment history of a title or part of one.
    pub async fn versions(&self, title: u32, hierarchy: &Hierarchy) -> Result<VersionsResponse> {
        check_title(title)?;
        let path = format!("api/versioner/v1/versions/title-{}.json", title);
        self.http.get_json(&path, &hierarchy.to_query()).await
    }

    /// Source XML for a title or part of one.
    pub async fn source(
        &self,
        title: u32,
        date: Option<&str>,
        hierarchy: &Hierarchy,
    ) -> Result<String> {
        check_title(title)?;
        let date = self.resolve_date(title, date).await?;
        let path = format!("api/versioner/v1/full/{}/title-{}.xml", date, title);
        let xml = self.http.get_text(&path, &hierarchy.to_query()).await?;
        info!(title, bytes = xml.len(), "Fetched regulation source");
        Ok(xml)
    }

    /// Source converted to structural JSON.
    pub async fn source_json(
        &self,
        title: u32,
        date: Option<&str>,
        hierarchy: &Hierarchy,
    ) -> Result<Value> {
        let xml = self.source(title, date, hierarchy).await?;
        Ok(xml::xml_to_json(&xml)?)
    }

    /// Source read as a regulation document tree.
    pub async fn source_document(
        &self,
        title: u32,
        date: Option<&str>,
        hierarchy: &Hierarchy,
    ) -> Result<RegulationDocument> {
        let xml = self.source(title, date, hierarchy).await?;
        Ok(xml::parse_regulation_document(&xml)?)
    }

    /// Full-text search across regulations.
    pub async fn search(&self, params: &RegulationSearch) -> Result<RegulationSearchResponse> {
        if params.query.trim().is_empty() {
            return Err(Error::InvalidInput("search query is empty".to_string()));
        }
        if let Some(title) = params.title {
            check_title(title)?;
        }
        if let Some(date) = params.date.as_deref().filter(|d| !d.trim().is_empty()) {
            check_date(date.trim())?;
        }
        let response: RegulationSearchResponse = self
            .http
            .get_json("api/search/v1/results", &params.to_query())
            .await?;
        info!(count = response.total_count(), "Regulation search completed");
        Ok(response)
    }
}

fn check_title(title: u32) -> Result<()> {
    if (1..=MAX_TITLE).contains(&title) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "CFR title must be between 1 and {}, got {}",
            MAX_TITLE, title
        )))
    }
}

/// Dates go into URL paths, so only real calendar dates in `YYYY-MM-DD`
/// form are accepted.
fn check_date(date: &str) -> Result<()> {
    let valid = date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "date must be a valid YYYY-MM-DD date, got {:?}",
            date
        )))
    }
}

/// Builder for creating an EcfrClient.
pub struct EcfrClientBuilder {
    base_url: String,
    timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
}

impl EcfrClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: ECFR_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<EcfrClient> {
        let mut config = ClientConfig::parse(&self.base_url)?;
        config.timeout = self.timeout;
        config.rate_limit = self.rate_limit;
        EcfrClient::from_config(config)
    }
}

impl Default for EcfrClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> EcfrClient {
        EcfrClient::builder().base_url(server.uri()).build().unwrap()
    }

    async fn mount_titles(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/titles.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "titles": [
                    {"number": 29, "name": "Labor", "up_to_date_as_of": "2024-08-20", "reserved": false},
                    {"number": 35, "name": "[Reserved]", "reserved": true}
                ]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_hierarchy_for_section() {
        let hierarchy = Hierarchy::for_section("§ 1910.1200");
        assert_eq!(hierarchy.part.as_deref(), Some("1910"));
        assert_eq!(
            hierarchy.to_query(),
            vec![
                ("part", "1910".to_string()),
                ("section", "1910.1200".to_string())
            ]
        );
        assert!(Hierarchy::default().is_empty());
    }

    #[test]
    fn test_search_query() {
        let params = RegulationSearch {
            title: Some(40),
            agency: Some("environmental-protection-agency".to_string()),
            ..RegulationSearch::new("air quality")
        };
        let query = params.to_query();
        assert!(query.contains(&("hierarchy[title]", "40".to_string())));
        assert!(query.contains(&("per_page", "20".to_string())));
        assert!(query.contains(&("page", "1".to_string())));
    }

    #[test]
    fn test_check_date() {
        assert!(check_date("2024-01-31").is_ok());
        assert!(check_date("2024-1-31").is_err());
        assert!(check_date("../../x").is_err());
        assert!(check_date("2024-13-99").is_err());
        assert!(check_date("2023-02-29").is_err());
        assert!(check_date("2024-02-29").is_ok());
    }

    #[tokio::test]
    async fn test_structure_uses_latest_date() {
        let server = MockServer::start().await;
        mount_titles(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/structure/2024-08-20/title-29.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "title",
                "identifier": "29",
                "label": "Title 29 - Labor",
                "children": [{"type": "chapter", "identifier": "XVII"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let node = client(&server).await.structure(29, None).await.unwrap();
        assert_eq!(node.node_type, "title");
        assert_eq!(node.children.len(), 1);
    }

    #[tokio::test]
    async fn test_reserved_title_is_not_found() {
        let server = MockServer::start().await;
        mount_titles(&server).await;

        let err = client(&server).await.latest_date(35).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_title_out_of_range_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).await.structure(51, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_source_document_for_section() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/versioner/v1/full/2024-01-01/title-29.xml"))
            .and(query_param("part", "1910"))
            .and(query_param("section", "1910.1200"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<DIV8 N="1910.1200" TYPE="SECTION"><HEAD>§ 1910.1200 Hazard communication.</HEAD><P>(a) Purpose.</P></DIV8>"#,
            ))
            .mount(&server)
            .await;

        let doc = client(&server)
            .await
            .source_document(29, Some("2024-01-01"), &Hierarchy::for_section("1910.1200"))
            .await
            .unwrap();
        assert_eq!(doc.node_type, "section");
        assert_eq!(doc.paragraphs, vec!["(a) Purpose.".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_source_is_xml_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<DIV5><P>broken</DIV5>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .source_json(29, Some("2024-01-01"), &Hierarchy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[tokio::test]
    async fn test_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/search/v1/results"))
            .and(query_param("query", "hazard communication"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "starts_on": "2012-05-25",
                    "type": "Section",
                    "hierarchy": {"title": "29", "part": "1910", "section": "1910.1200"},
                    "headings": {"section": "Hazard communication."},
                    "full_text_excerpt": "...<strong>hazard</strong>..."
                }],
                "meta": {"current_page": 1, "total_count": 1, "total_pages": 1}
            })))
            .mount(&server)
            .await;

        let response = client(&server)
            .await
            .search(&RegulationSearch::new("hazard communication"))
            .await
            .unwrap();
        assert_eq!(response.total_count(), 1);
        assert_eq!(response.results[0].hierarchy["section"], "1910.1200");
    }
}
