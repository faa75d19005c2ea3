//! Search API (`GET search/`).
//!
//! Every search type shares one endpoint; the `type` parameter selects the
//! index. Empty filters are left out of the query string entirely.

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::SearchResponse;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default result count per search.
pub const DEFAULT_LIMIT: u32 = 20;
/// Default sort order.
pub const DEFAULT_ORDER: &str = "score desc";

/// Query pairs for the search endpoint.
#[derive(Debug, Default)]
struct SearchQuery(Vec<(&'static str, String)>);

impl SearchQuery {
    fn new(q: &str, search_type: &'static str, order_by: Option<&str>) -> Self {
        let mut query = Self::default();
        query.push("q", q);
        query.push("type", search_type);
        query.push("order_by", order_by.unwrap_or(DEFAULT_ORDER));
        query
    }

    fn push(&mut self, key: &'static str, value: &str) {
        self.0.push((key, value.to_string()));
    }

    fn opt(&mut self, key: &'static str, value: &Option<String>) -> &mut Self {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    fn count(&mut self, key: &'static str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value.filter(|v| *v > 0) {
            self.0.push((key, value.to_string()));
        }
        self
    }

    fn limit(mut self, limit: Option<u32>) -> Vec<(&'static str, String)> {
        self.0
            .push(("hit", limit.unwrap_or(DEFAULT_LIMIT).to_string()));
        self.0
    }
}

/// Keyword (BM25) search over opinion clusters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpinionSearch {
    pub q: String,
    pub court: Option<String>,
    pub case_name: Option<String>,
    pub judge: Option<String>,
    pub filed_after: Option<String>,
    pub filed_before: Option<String>,
    pub cited_gt: Option<u32>,
    pub cited_lt: Option<u32>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl OpinionSearch {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.q, "o", self.order_by.as_deref());
        query.push("highlight", "on");
        query
            .opt("court", &self.court)
            .opt("case_name", &self.case_name)
            .opt("judge", &self.judge)
            .opt("filed_after", &self.filed_after)
            .opt("filed_before", &self.filed_before)
            .count("cited_gt", self.cited_gt)
            .count("cited_lt", self.cited_lt);
        query.limit(self.limit)
    }
}

/// Natural-language search over opinions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticSearch {
    pub natural_query: String,
    pub court: Option<String>,
    pub filed_after: Option<String>,
    pub filed_before: Option<String>,
    pub cited_gt: Option<u32>,
    pub cited_lt: Option<u32>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl SemanticSearch {
    pub fn new(natural_query: impl Into<String>) -> Self {
        Self {
            natural_query: natural_query.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.natural_query, "o", self.order_by.as_deref());
        query.push("semantic", "true");
        query.push("highlight", "on");
        query
            .opt("court", &self.court)
            .opt("filed_after", &self.filed_after)
            .opt("filed_before", &self.filed_before)
            .count("cited_gt", self.cited_gt)
            .count("cited_lt", self.cited_lt);
        query.limit(self.limit)
    }
}

/// Docket search, used for both plain dockets and dockets with documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocketSearch {
    pub q: String,
    pub court: Option<String>,
    pub case_name: Option<String>,
    pub docket_number: Option<String>,
    pub date_filed_after: Option<String>,
    pub date_filed_before: Option<String>,
    pub party_name: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl DocketSearch {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    fn to_query_as(&self, search_type: &'static str) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.q, search_type, self.order_by.as_deref());
        query
            .opt("court", &self.court)
            .opt("case_name", &self.case_name)
            .opt("docket_number", &self.docket_number)
            .opt("date_filed_after", &self.date_filed_after)
            .opt("date_filed_before", &self.date_filed_before)
            .opt("party_name", &self.party_name);
        query.limit(self.limit)
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        self.to_query_as("d")
    }
}

/// RECAP filing document search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapSearch {
    pub q: String,
    pub court: Option<String>,
    pub case_name: Option<String>,
    pub docket_number: Option<String>,
    pub document_number: Option<String>,
    pub attachment_number: Option<String>,
    pub filed_after: Option<String>,
    pub filed_before: Option<String>,
    pub party_name: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl RecapSearch {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.q, "rd", self.order_by.as_deref());
        query
            .opt("court", &self.court)
            .opt("case_name", &self.case_name)
            .opt("docket_number", &self.docket_number)
            .opt("document_number", &self.document_number)
            .opt("attachment_number", &self.attachment_number)
            .opt("filed_after", &self.filed_after)
            .opt("filed_before", &self.filed_before)
            .opt("party_name", &self.party_name);
        query.limit(self.limit)
    }
}

/// Oral argument audio search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSearch {
    pub q: String,
    pub court: Option<String>,
    pub case_name: Option<String>,
    pub judge: Option<String>,
    pub argued_after: Option<String>,
    pub argued_before: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl AudioSearch {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.q, "oa", self.order_by.as_deref());
        query
            .opt("court", &self.court)
            .opt("case_name", &self.case_name)
            .opt("judge", &self.judge)
            .opt("dateArgued_after", &self.argued_after)
            .opt("dateArgued_before", &self.argued_before);
        query.limit(self.limit)
    }
}

/// Judge and legal professional search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeopleSearch {
    pub q: String,
    pub name: Option<String>,
    pub position_type: Option<String>,
    pub political_affiliation: Option<String>,
    pub school: Option<String>,
    pub appointed_by: Option<String>,
    pub selection_method: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl PeopleSearch {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = SearchQuery::new(&self.q, "p", self.order_by.as_deref());
        query
            .opt("name", &self.name)
            .opt("position_type", &self.position_type)
            .opt("political_affiliation", &self.political_affiliation)
            .opt("school", &self.school)
            .opt("appointed_by", &self.appointed_by)
            .opt("selection_method", &self.selection_method);
        query.limit(self.limit)
    }
}

/// Search API.
pub struct SearchApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    async fn run(&self, kind: &str, query: Vec<(&'static str, String)>) -> Result<SearchResponse> {
        self.client.require_api_key()?;
        let response: SearchResponse = self.client.http.get_json("search/", &query).await?;
        info!(kind, count = response.total(), "Search completed");
        Ok(response)
    }

    /// Keyword search over opinions.
    pub async fn opinions(&self, params: &OpinionSearch) -> Result<SearchResponse> {
        self.run("opinions", params.to_query()).await
    }

    /// Semantic search over opinions.
    pub async fn semantic(&self, params: &SemanticSearch) -> Result<SearchResponse> {
        self.run("semantic", params.to_query()).await
    }

    pub async fn dockets(&self, params: &DocketSearch) -> Result<SearchResponse> {
        self.run("dockets", params.to_query_as("d")).await
    }

    /// Dockets with up to three nested documents each.
    pub async fn dockets_with_documents(&self, params: &DocketSearch) -> Result<SearchResponse> {
        self.run("dockets_with_documents", params.to_query_as("r"))
            .await
    }

    pub async fn recap_documents(&self, params: &RecapSearch) -> Result<SearchResponse> {
        self.run("recap_documents", params.to_query()).await
    }

    pub async fn audio(&self, params: &AudioSearch) -> Result<SearchResponse> {
        self.run("audio", params.to_query()).await
    }

    pub async fn people(&self, params: &PeopleSearch) -> Result<SearchResponse> {
        self.run("people", params.to_query()).await
    }
}
