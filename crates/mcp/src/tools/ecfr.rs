// eCFR tools: titles, agencies, search, structure and regulation text

use crate::context::ToolContext;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::args::{check_date, check_range, parse_args, require_text};
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
use anyhow::{anyhow, bail, Result};
use courtlistener_sdk::ecfr::MAX_TITLE;
use courtlistener_sdk::{Hierarchy, RegulationSearch};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

const MAX_PER_PAGE: u32 = 1000;
const SOURCE_FORMATS: &[&str] = &["json", "tree", "xml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcfrOperation {
    ListTitles,
    ListAgencies,
    Search,
    Structure,
    Ancestry,
    Versions,
    Source,
    Section,
}

impl EcfrOperation {
    pub const ALL: [EcfrOperation; 8] = [
        EcfrOperation::ListTitles,
        EcfrOperation::ListAgencies,
        EcfrOperation::Search,
        EcfrOperation::Structure,
        EcfrOperation::Ancestry,
        EcfrOperation::Versions,
        EcfrOperation::Source,
        EcfrOperation::Section,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            EcfrOperation::ListTitles => "ecfr_list_titles",
            EcfrOperation::ListAgencies => "ecfr_list_agencies",
            EcfrOperation::Search => "ecfr_search",
            EcfrOperation::Structure => "ecfr_get_structure",
            EcfrOperation::Ancestry => "ecfr_get_ancestry",
            EcfrOperation::Versions => "ecfr_get_versions",
            EcfrOperation::Source => "ecfr_get_source",
            EcfrOperation::Section => "ecfr_get_section",
        }
    }

    fn description(self) -> &'static str {
        match self {
            EcfrOperation::ListTitles => {
                "List all 50 CFR titles with their latest amendment and currency dates."
            }
            EcfrOperation::ListAgencies => {
                "List federal agencies and the CFR titles and chapters they administer."
            }
            EcfrOperation::Search => {
                "Full-text search of the Code of Federal Regulations, optionally limited to a \
                 title, an agency or a point in time."
            }
            EcfrOperation::Structure => {
                "Get the table of contents of a CFR title (chapters, parts, subparts and \
                 sections) without regulation text."
            }
            EcfrOperation::Ancestry => {
                "Get the chain of parent nodes for a position in a CFR title, from the title \
                 down."
            }
            EcfrOperation::Versions => {
                "Get the amendment history of a CFR title, part or section."
            }
            EcfrOperation::Source => {
                "Get regulation text for a CFR title or part of one, as structural JSON, as a \
                 document tree of headings and paragraphs, or as raw XML."
            }
            EcfrOperation::Section => {
                "Get the text of a single CFR section such as 1910.1200 in title 29."
            }
        }
    }

    fn input_schema(self) -> Value {
        let title = json_schema_integer("CFR title number (1-50)", 1, Some(MAX_TITLE as i64));
        let date = json_schema_string("Point-in-time date (YYYY-MM-DD); latest when omitted");

        let mut props = Map::new();
        let mut required = Vec::new();
        match self {
            EcfrOperation::ListTitles | EcfrOperation::ListAgencies => {}
            EcfrOperation::Search => {
                props.insert("query".into(), json_schema_string("Search terms"));
                props.insert("title".into(), title);
                props.insert(
                    "agency".into(),
                    json_schema_string("Agency slug (e.g. 'environmental-protection-agency')"),
                );
                props.insert("date".into(), date);
                props.insert(
                    "per_page".into(),
                    json_schema_integer("Results per page (default 20)", 1, Some(MAX_PER_PAGE as i64)),
                );
                props.insert("page".into(), json_schema_integer("Page number (default 1)", 1, None));
                required.push("query");
            }
            EcfrOperation::Structure => {
                props.insert("title".into(), title);
                props.insert("date".into(), date);
                required.push("title");
            }
            EcfrOperation::Ancestry | EcfrOperation::Versions | EcfrOperation::Source => {
                props.insert("title".into(), title);
                if self != EcfrOperation::Versions {
                    props.insert("date".into(), date);
                }
                for level in ["chapter", "subchapter", "part", "subpart", "section", "appendix"] {
                    props.insert(
                        level.into(),
                        json_schema_string(&format!("Limit to this {}", level)),
                    );
                }
                if self == EcfrOperation::Source {
                    props.insert(
                        "format".into(),
                        json_schema_enum(
                            "'json' for structural JSON, 'tree' for headings and paragraphs, 'xml' for raw XML",
                            SOURCE_FORMATS,
                        ),
                    );
                }
                required.push("title");
            }
            EcfrOperation::Section => {
                props.insert("title".into(), title);
                props.insert(
                    "section".into(),
                    json_schema_string("Section number, e.g. '1910.1200'"),
                );
                props.insert("date".into(), date);
                required.extend(["title", "section"]);
            }
        }
        json_schema_object(Value::Object(props), required)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleArgs {
    title: Option<u32>,
    date: Option<String>,
    format: Option<String>,
    #[serde(flatten)]
    hierarchy: Hierarchy,
}

impl TitleArgs {
    fn title(&self) -> Result<u32> {
        let title = self.title.ok_or_else(|| anyhow!("title is required"))?;
        check_range("title", title, 1, MAX_TITLE)
    }

    fn date(&self) -> Result<Option<&str>> {
        check_date("date", &self.date)?;
        Ok(self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()))
    }
}

/// One eCFR endpoint exposed as an MCP tool.
pub struct EcfrTool {
    operation: EcfrOperation,
    ctx: Arc<ToolContext>,
}

impl EcfrTool {
    pub fn new(operation: EcfrOperation, ctx: Arc<ToolContext>) -> Self {
        Self { operation, ctx }
    }

    async fn run(&self, arguments: Value) -> Result<Value> {
        let name = self.operation.tool_name();
        let ecfr = &self.ctx.ecfr;

        match self.operation {
            EcfrOperation::ListTitles => {
                info!(tool = name, "Listing CFR titles");
                Ok(serde_json::to_value(ecfr.titles().await?)?)
            }
            EcfrOperation::ListAgencies => {
                info!(tool = name, "Listing agencies");
                Ok(serde_json::to_value(ecfr.agencies().await?)?)
            }
            EcfrOperation::Search => {
                let params: RegulationSearch = parse_args(name, arguments)?;
                let query = require_text("query", &params.query)?;
                info!(tool = name, query, "Searching regulations");
                if let Some(title) = params.title {
                    check_range("title", title, 1, MAX_TITLE)?;
                }
                check_range("per_page", params.per_page.unwrap_or(20), 1, MAX_PER_PAGE)?;
                check_range("page", params.page.unwrap_or(1), 1, u32::MAX)?;
                check_date("date", &params.date)?;
                Ok(serde_json::to_value(ecfr.search(&params).await?)?)
            }
            EcfrOperation::Structure => {
                let args: TitleArgs = parse_args(name, arguments)?;
                let title = args.title()?;
                info!(tool = name, title, "Fetching title structure");
                Ok(serde_json::to_value(ecfr.structure(title, args.date()?).await?)?)
            }
            EcfrOperation::Ancestry => {
                let args: TitleArgs = parse_args(name, arguments)?;
                let title = args.title()?;
                info!(tool = name, title, "Fetching ancestry");
                let ancestry = ecfr.ancestry(title, args.date()?, &args.hierarchy).await?;
                Ok(serde_json::to_value(ancestry)?)
            }
            EcfrOperation::Versions => {
                let args: TitleArgs = parse_args(name, arguments)?;
                let title = args.title()?;
                info!(tool = name, title, "Fetching versions");
                Ok(serde_json::to_value(ecfr.versions(title, &args.hierarchy).await?)?)
            }
            EcfrOperation::Source => {
                let args: TitleArgs = parse_args(name, arguments)?;
                let title = args.title()?;
                let date = args.date()?;
                let format = args
                    .format
                    .as_deref()
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .unwrap_or("json");
                if !SOURCE_FORMATS.contains(&format) {
                    bail!("format must be one of json, tree, xml, got {:?}", format);
                }
                info!(tool = name, title, format, "Fetching regulation source");

                let hierarchy = &args.hierarchy;
                let content = match format {
                    "tree" => serde_json::to_value(ecfr.source_document(title, date, hierarchy).await?)?,
                    "xml" => Value::String(ecfr.source(title, date, hierarchy).await?),
                    _ => ecfr.source_json(title, date, hierarchy).await?,
                };
                Ok(json!({
                    "title": title,
                    "date": date,
                    "hierarchy": hierarchy,
                    "format": format,
                    "content": content,
                }))
            }
            EcfrOperation::Section => {
                let args: TitleArgs = parse_args(name, arguments)?;
                let title = args.title()?;
                let section = require_text("section", args.hierarchy.section.as_deref().unwrap_or(""))?;
                let section = section.trim_start_matches('§').trim();
                if section.is_empty() || !section.contains('.') {
                    bail!("section must look like '1910.1200', got {:?}", section);
                }
                info!(tool = name, title, section, "Fetching section");

                let hierarchy = Hierarchy::for_section(section);
                let document = ecfr.source_document(title, args.date()?, &hierarchy).await?;
                let node = document
                    .find("section", section)
                    .cloned()
                    .unwrap_or(document);
                Ok(json!({
                    "title": title,
                    "part": hierarchy.part,
                    "section": section,
                    "heading": node.heading,
                    "text": node.full_text(),
                    "document": node,
                }))
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for EcfrTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.operation.tool_name().to_string(),
            description: self.operation.description().to_string(),
            input_schema: self.operation.input_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let result = self.run(arguments).await?;
        Ok(CallToolResult::json(&result))
    }
}

/// Register every eCFR tool.
pub fn register(registry: &mut ToolRegistry, ctx: &Arc<ToolContext>) {
    for operation in EcfrOperation::ALL {
        registry.register(Arc::new(EcfrTool::new(operation, ctx.clone())));
    }
}
