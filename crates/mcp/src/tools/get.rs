// Get-by-id tools for individual CourtListener records

use crate::context::ToolContext;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::args::{parse_args, parse_id};
use crate::tools::{json_schema_id, json_schema_object, json_schema_string, Tool, ToolRegistry};
use anyhow::{bail, Result};
use courtlistener_sdk::api::is_court_id;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Opinion,
    Docket,
    Audio,
    Cluster,
    Person,
    Court,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Opinion,
        RecordKind::Docket,
        RecordKind::Audio,
        RecordKind::Cluster,
        RecordKind::Person,
        RecordKind::Court,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            RecordKind::Opinion => "opinion",
            RecordKind::Docket => "docket",
            RecordKind::Audio => "audio_by_id",
            RecordKind::Cluster => "cluster",
            RecordKind::Person => "person",
            RecordKind::Court => "court",
        }
    }

    fn id_field(self) -> &'static str {
        match self {
            RecordKind::Opinion => "opinion_id",
            RecordKind::Docket => "docket_id",
            RecordKind::Audio => "audio_id",
            RecordKind::Cluster => "cluster_id",
            RecordKind::Person => "person_id",
            RecordKind::Court => "court_id",
        }
    }

    fn description(self) -> &'static str {
        match self {
            RecordKind::Opinion => {
                "Get a specific court opinion by ID, including its full text when available."
            }
            RecordKind::Docket => "Get a specific docket (case) by ID.",
            RecordKind::Audio => "Get a specific oral argument audio recording by ID.",
            RecordKind::Cluster => {
                "Get a specific opinion cluster by ID: the case, its citations and the \
                 opinions that make it up."
            }
            RecordKind::Person => "Get a specific judge or legal professional by ID.",
            RecordKind::Court => "Get a specific court by ID (e.g. 'scotus', 'ca9').",
        }
    }
}

/// Court ids are slugs such as `scotus` or `ca9`.
fn court_id<'a>(field: &str, raw: &'a Value) -> Result<&'a str> {
    let id = match raw {
        Value::String(s) => s.trim(),
        Value::Null => bail!("{} is required", field),
        other => bail!("{} must be a string, got {}", field, other),
    };
    if !is_court_id(id) {
        bail!(
            "{} must contain only lowercase letters, digits, '_' or '-', got {:?}",
            field,
            id
        );
    }
    Ok(id)
}

/// Fetches one record by id.
pub struct GetTool {
    kind: RecordKind,
    ctx: Arc<ToolContext>,
}

impl GetTool {
    pub fn new(kind: RecordKind, ctx: Arc<ToolContext>) -> Self {
        Self { kind, ctx }
    }

    async fn fetch(&self, arguments: Value) -> Result<Value> {
        let field = self.kind.id_field();
        let args: Map<String, Value> = parse_args(self.kind.tool_name(), arguments)?;
        let raw = args.get(field).unwrap_or(&Value::Null);
        let client = &self.ctx.courtlistener;
        info!(tool = self.kind.tool_name(), id = %raw, "Fetching record");

        let record = match self.kind {
            RecordKind::Opinion => serde_json::to_value(client.opinions().get(parse_id(field, raw)?).await?)?,
            RecordKind::Docket => serde_json::to_value(client.dockets().get(parse_id(field, raw)?).await?)?,
            RecordKind::Audio => serde_json::to_value(client.audio().get(parse_id(field, raw)?).await?)?,
            RecordKind::Cluster => serde_json::to_value(client.clusters().get(parse_id(field, raw)?).await?)?,
            RecordKind::Person => serde_json::to_value(client.people().get(parse_id(field, raw)?).await?)?,
            RecordKind::Court => serde_json::to_value(client.courts().get(court_id(field, raw)?).await?)?,
        };
        Ok(record)
    }
}

#[async_trait::async_trait]
impl Tool for GetTool {
    fn schema(&self) -> ToolSchema {
        let field = self.kind.id_field();
        let id_schema = if self.kind == RecordKind::Court {
            json_schema_string("The court ID (e.g. 'scotus', 'ca9')")
        } else {
            json_schema_id(&format!("The {} to retrieve", field.replace('_', " ")))
        };
        ToolSchema {
            name: self.kind.tool_name().to_string(),
            description: self.kind.description().to_string(),
            input_schema: json_schema_object(json!({ field: id_schema }), vec![field]),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let record = self.fetch(arguments).await?;
        Ok(CallToolResult::json(&record))
    }
}

/// Register every get-by-id tool.
pub fn register(registry: &mut ToolRegistry, ctx: &Arc<ToolContext>) {
    for kind in RecordKind::ALL {
        registry.register(Arc::new(GetTool::new(kind, ctx.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::context;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_opinion_accepts_string_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/opinions/108713/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 108713,
                "plain_text": "Opinion text",
                "resource_uri": "/api/rest/v4/opinions/108713/"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetTool::new(RecordKind::Opinion, Arc::new(context(&server.uri())));
        let result = tool.execute(json!({"opinion_id": "108713"})).await.unwrap();
        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(body["id"], 108713);
        assert_eq!(body["resource_uri"], "/api/rest/v4/opinions/108713/");
    }

    #[tokio::test]
    async fn test_audio_by_id_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/audio/77/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77, "duration": 3600})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetTool::new(RecordKind::Audio, Arc::new(context(&server.uri())));
        assert_eq!(tool.schema().name, "audio_by_id");
        let result = tool.execute(json!({"audio_id": 77})).await.unwrap();
        assert!(result.text_content().contains("3600"));
    }

    #[tokio::test]
    async fn test_bad_ids_make_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(0)
            .mount(&server)
            .await;
        let ctx = Arc::new(context(&server.uri()));

        let docket = GetTool::new(RecordKind::Docket, ctx.clone());
        assert!(docket.execute(json!({"docket_id": 0})).await.is_err());
        assert!(docket.execute(json!({"docket_id": "12a"})).await.is_err());
        assert!(docket.execute(json!({})).await.is_err());

        let court = GetTool::new(RecordKind::Court, ctx);
        assert!(court.execute(json!({"court_id": "../admin"})).await.is_err());
        assert!(court.execute(json!({"court_id": 5})).await.is_err());
    }

    #[tokio::test]
    async fn test_not_found_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courts/nowhere/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No Court matches the given query."})))
            .mount(&server)
            .await;

        let tool = GetTool::new(RecordKind::Court, Arc::new(context(&server.uri())));
        let err = tool.execute(json!({"court_id": "nowhere"})).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
