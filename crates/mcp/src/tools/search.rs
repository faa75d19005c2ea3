// Search tools backed by the CourtListener search endpoint

use crate::context::ToolContext;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::args::{
    check_cited, check_date_range, check_limit, check_order_by, parse_args, require_text,
};
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
use anyhow::Result;
use courtlistener_sdk::{
    AudioSearch, DocketSearch, OpinionSearch, PeopleSearch, RecapSearch, SemanticSearch,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

const OPINION_ORDERS: &[&str] = &["score desc", "dateFiled desc", "dateFiled asc"];
const AUDIO_ORDERS: &[&str] = &["score desc", "dateArgued desc", "dateArgued asc"];
const PEOPLE_ORDERS: &[&str] = &["score desc", "name asc"];

/// The search indexes exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Opinions,
    Semantic,
    Dockets,
    DocketsWithDocuments,
    RecapDocuments,
    Audio,
    People,
}

impl SearchKind {
    pub const ALL: [SearchKind; 7] = [
        SearchKind::Opinions,
        SearchKind::Semantic,
        SearchKind::Dockets,
        SearchKind::DocketsWithDocuments,
        SearchKind::RecapDocuments,
        SearchKind::Audio,
        SearchKind::People,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            SearchKind::Opinions => "opinions",
            SearchKind::Semantic => "semantic_search",
            SearchKind::Dockets => "dockets",
            SearchKind::DocketsWithDocuments => "dockets_with_documents",
            SearchKind::RecapDocuments => "recap_documents",
            SearchKind::Audio => "audio",
            SearchKind::People => "people",
        }
    }

    fn description(self) -> &'static str {
        match self {
            SearchKind::Opinions => {
                "Search case law opinion clusters using keyword (BM25) search. Best for case \
                 names, citations, exact legal terms and Boolean queries. Results include \
                 highlighted snippets."
            }
            SearchKind::Semantic => {
                "Search case law with a natural-language question. Finds opinions by meaning \
                 rather than exact keywords; use the opinions tool for case names or Boolean \
                 queries."
            }
            SearchKind::Dockets => "Search federal cases (dockets) from PACER.",
            SearchKind::DocketsWithDocuments => {
                "Search federal cases (dockets) with up to three nested documents each. \
                 More matching documents are reported per docket."
            }
            SearchKind::RecapDocuments => {
                "Search individual filing documents from PACER (RECAP archive)."
            }
            SearchKind::Audio => "Search oral argument audio recordings.",
            SearchKind::People => "Search judges and other legal professionals.",
        }
    }

    fn orders(self) -> &'static [&'static str] {
        match self {
            SearchKind::Audio => AUDIO_ORDERS,
            SearchKind::People => PEOPLE_ORDERS,
            _ => OPINION_ORDERS,
        }
    }

    fn properties(self) -> (Map<String, Value>, &'static str) {
        let mut props = Map::new();
        let mut add = |name: &str, schema: Value| {
            props.insert(name.to_string(), schema);
        };

        let required = match self {
            SearchKind::Semantic => {
                add(
                    "natural_query",
                    json_schema_string(
                        "Natural language description of the legal concept or question \
                         (e.g. 'cases about police use of force')",
                    ),
                );
                "natural_query"
            }
            SearchKind::People => {
                add("q", json_schema_string("Search query for judges and legal professionals"));
                "q"
            }
            _ => {
                add("q", json_schema_string("Full-text search query"));
                "q"
            }
        };

        match self {
            SearchKind::Opinions | SearchKind::Semantic => {
                add("court", json_schema_string("Court ID filter (e.g. 'scotus', 'ca9')"));
                if self == SearchKind::Opinions {
                    add("case_name", json_schema_string("Filter by case name"));
                    add("judge", json_schema_string("Filter by judge name"));
                }
                add("filed_after", json_schema_string("Only opinions filed after this date (YYYY-MM-DD)"));
                add("filed_before", json_schema_string("Only opinions filed before this date (YYYY-MM-DD)"));
                add("cited_gt", json_schema_integer("Minimum number of times the opinion has been cited", 0, None));
                add("cited_lt", json_schema_integer("Maximum number of times the opinion has been cited", 0, None));
            }
            SearchKind::Dockets | SearchKind::DocketsWithDocuments => {
                add("court", json_schema_string("Court ID filter (e.g. 'cand', 'nysd')"));
                add("case_name", json_schema_string("Filter by case name"));
                add("docket_number", json_schema_string("Filter by docket number"));
                add("date_filed_after", json_schema_string("Only cases filed after this date (YYYY-MM-DD)"));
                add("date_filed_before", json_schema_string("Only cases filed before this date (YYYY-MM-DD)"));
                add("party_name", json_schema_string("Filter by party name"));
            }
            SearchKind::RecapDocuments => {
                add("court", json_schema_string("Court ID filter (e.g. 'cand', 'nysd')"));
                add("case_name", json_schema_string("Filter by case name"));
                add("docket_number", json_schema_string("Filter by docket number"));
                add("document_number", json_schema_string("Filter by document number"));
                add("attachment_number", json_schema_string("Filter by attachment number"));
                add("filed_after", json_schema_string("Only documents filed after this date (YYYY-MM-DD)"));
                add("filed_before", json_schema_string("Only documents filed before this date (YYYY-MM-DD)"));
                add("party_name", json_schema_string("Filter by party name"));
            }
            SearchKind::Audio => {
                add("court", json_schema_string("Court ID filter (e.g. 'scotus', 'ca9')"));
                add("case_name", json_schema_string("Filter by case name"));
                add("judge", json_schema_string("Filter by judge name"));
                add("argued_after", json_schema_string("Only arguments after this date (YYYY-MM-DD)"));
                add("argued_before", json_schema_string("Only arguments before this date (YYYY-MM-DD)"));
            }
            SearchKind::People => {
                add("name", json_schema_string("Filter by name"));
                add("position_type", json_schema_string("Filter by position type (e.g. 'jud')"));
                add("political_affiliation", json_schema_string("Filter by political affiliation (e.g. 'd', 'r')"));
                add("school", json_schema_string("Filter by school attended"));
                add("appointed_by", json_schema_string("Filter by appointing authority"));
                add("selection_method", json_schema_string("Filter by selection method"));
            }
        }

        add("order_by", json_schema_enum("Sort order", self.orders()));
        add("limit", json_schema_integer("Maximum results to return (default 20)", 1, Some(100)));
        (props, required)
    }
}

/// One search index exposed as an MCP tool.
pub struct SearchTool {
    kind: SearchKind,
    ctx: Arc<ToolContext>,
}

impl SearchTool {
    pub fn new(kind: SearchKind, ctx: Arc<ToolContext>) -> Self {
        Self { kind, ctx }
    }

    async fn run(&self, arguments: Value) -> Result<Value> {
        let name = self.kind.tool_name();
        let search = self.ctx.courtlistener.search();
        let orders = self.kind.orders();

        let response = match self.kind {
            SearchKind::Opinions => {
                let params: OpinionSearch = parse_args(name, arguments)?;
                let q = require_text("q", &params.q)?;
                info!(tool = name, q, "Searching opinions");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                check_cited(params.cited_gt, params.cited_lt)?;
                check_date_range("filed_after", &params.filed_after, "filed_before", &params.filed_before)?;
                search.opinions(&params).await?
            }
            SearchKind::Semantic => {
                let params: SemanticSearch = parse_args(name, arguments)?;
                let q = require_text("natural_query", &params.natural_query)?;
                info!(tool = name, q, "Semantic search");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                check_cited(params.cited_gt, params.cited_lt)?;
                check_date_range("filed_after", &params.filed_after, "filed_before", &params.filed_before)?;
                search.semantic(&params).await?
            }
            SearchKind::Dockets | SearchKind::DocketsWithDocuments => {
                let params: DocketSearch = parse_args(name, arguments)?;
                let q = require_text("q", &params.q)?;
                info!(tool = name, q, "Searching dockets");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                check_date_range(
                    "date_filed_after",
                    &params.date_filed_after,
                    "date_filed_before",
                    &params.date_filed_before,
                )?;
                if self.kind == SearchKind::Dockets {
                    search.dockets(&params).await?
                } else {
                    search.dockets_with_documents(&params).await?
                }
            }
            SearchKind::RecapDocuments => {
                let params: RecapSearch = parse_args(name, arguments)?;
                let q = require_text("q", &params.q)?;
                info!(tool = name, q, "Searching RECAP documents");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                check_date_range("filed_after", &params.filed_after, "filed_before", &params.filed_before)?;
                search.recap_documents(&params).await?
            }
            SearchKind::Audio => {
                let params: AudioSearch = parse_args(name, arguments)?;
                let q = require_text("q", &params.q)?;
                info!(tool = name, q, "Searching oral arguments");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                check_date_range("argued_after", &params.argued_after, "argued_before", &params.argued_before)?;
                search.audio(&params).await?
            }
            SearchKind::People => {
                let params: PeopleSearch = parse_args(name, arguments)?;
                let q = require_text("q", &params.q)?;
                info!(tool = name, q, "Searching people");
                check_limit(params.limit)?;
                check_order_by(&params.order_by, orders)?;
                search.people(&params).await?
            }
        };

        Ok(serde_json::to_value(&response)?)
    }
}

#[async_trait::async_trait]
impl Tool for SearchTool {
    fn schema(&self) -> ToolSchema {
        let (properties, required) = self.kind.properties();
        ToolSchema {
            name: self.kind.tool_name().to_string(),
            description: self.kind.description().to_string(),
            input_schema: json_schema_object(Value::Object(properties), vec![required]),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let response = self.run(arguments).await?;
        Ok(CallToolResult::json(&response))
    }
}

/// Register every search tool.
pub fn register(registry: &mut ToolRegistry, ctx: &Arc<ToolContext>) {
    for kind in SearchKind::ALL {
        registry.register(Arc::new(SearchTool::new(kind, ctx.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{context, context_without_key};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_schemas() {
        let ctx = Arc::new(context_without_key("http://127.0.0.1:9/"));
        let semantic = SearchTool::new(SearchKind::Semantic, ctx.clone()).schema();
        assert_eq!(semantic.input_schema["required"], json!(["natural_query"]));
        assert!(semantic.input_schema["properties"].get("judge").is_none());

        let people = SearchTool::new(SearchKind::People, ctx).schema();
        assert_eq!(
            people.input_schema["properties"]["order_by"]["enum"],
            json!(["score desc", "name asc"])
        );
        assert_eq!(people.input_schema["properties"]["limit"]["maximum"], 100);
    }

    #[tokio::test]
    async fn test_opinions_returns_upstream_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("type", "o"))
            .and(query_param("court", "scotus"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{"caseName": "Roe v. Wade", "cluster_id": 108713, "court_id": "scotus"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = SearchTool::new(SearchKind::Opinions, Arc::new(context(&server.uri())));
        let result = tool
            .execute(json!({"q": "abortion", "court": "scotus", "limit": 5}))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["caseName"], "Roe v. Wade");
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
            .expect(0)
            .mount(&server)
            .await;
        let ctx = Arc::new(context(&server.uri()));

        let opinions = SearchTool::new(SearchKind::Opinions, ctx.clone());
        for args in [
            json!({"q": ""}),
            json!({"q": "x", "limit": 0}),
            json!({"q": "x", "limit": 101}),
            json!({"q": "x", "order_by": "name asc"}),
            json!({"q": "x", "cited_gt": 10, "cited_lt": 5}),
            json!({"q": "x", "filed_after": "2020-13-01"}),
            json!({"q": "x", "filed_after": "2021-01-01", "filed_before": "2020-01-01"}),
        ] {
            assert!(opinions.execute(args).await.is_err());
        }

        let audio = SearchTool::new(SearchKind::Audio, ctx);
        let err = audio
            .execute(json!({"q": "x", "order_by": "dateFiled desc"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("dateArgued desc"));
    }

    #[tokio::test]
    async fn test_dockets_with_documents_uses_type_r() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("type", "r"))
            .and(query_param("party_name", "Apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = SearchTool::new(
            SearchKind::DocketsWithDocuments,
            Arc::new(context(&server.uri())),
        );
        let result = tool
            .execute(json!({"q": "patent", "party_name": "Apple"}))
            .await
            .unwrap();
        assert!(!result.is_error());
    }

    #[tokio::test]
    async fn test_upstream_error_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
            )
            .mount(&server)
            .await;

        let tool = SearchTool::new(SearchKind::People, Arc::new(context(&server.uri())));
        let err = tool.execute(json!({"q": "Sotomayor"})).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid token."));
    }
}
