// Citation tools: CourtListener lookup plus local parsing and extraction

use crate::context::ToolContext;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::args::{parse_args, require_text};
use crate::tools::{
    json_schema_array, json_schema_boolean, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
use anyhow::{bail, Result};
use courtlistener_core::citation::{self, Citation};
use courtlistener_core::MatchMode;
use courtlistener_sdk::api::MAX_BATCH;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CitationArgs {
    #[serde(default)]
    citation: String,
}

#[derive(Debug, Deserialize)]
struct BatchArgs {
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ParseArgs {
    #[serde(default)]
    citation: String,
    #[serde(default = "default_true")]
    broad: bool,
}

#[derive(Debug, Deserialize)]
struct ExtractArgs {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EnhancedArgs {
    #[serde(default)]
    citation: String,
    #[serde(default = "default_true")]
    include_courtlistener: bool,
}

fn default_true() -> bool {
    true
}

fn citation_schema(description: &str) -> Value {
    json_schema_object(
        json!({ "citation": json_schema_string(description) }),
        vec!["citation"],
    )
}

/// Resolve a citation to opinion clusters through CourtListener.
pub struct LookupCitationTool {
    ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl Tool for LookupCitationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "lookup_citation".to_string(),
            description: "Look up a legal citation (e.g. '410 U.S. 113') and return the matching \
                          opinion clusters from CourtListener."
                .to_string(),
            input_schema: citation_schema("The citation to look up, e.g. '410 U.S. 113'"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: CitationArgs = parse_args("lookup_citation", arguments)?;
        let text = require_text("citation", &args.citation)?;
        info!(tool = "lookup_citation", citation = text, "Looking up citation");

        let results = self.ctx.courtlistener.citations().lookup(text).await?;
        Ok(CallToolResult::json(&serde_json::to_value(&results)?))
    }
}

/// Resolve many citations in a single request.
pub struct BatchLookupTool {
    ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl Tool for BatchLookupTool {
    fn schema(&self) -> ToolSchema {
        let mut citations = json_schema_array(
            json_schema_string("A citation"),
            "Citations to look up (1 to 100)",
        );
        citations["minItems"] = json!(1);
        citations["maxItems"] = json!(MAX_BATCH);
        ToolSchema {
            name: "batch_lookup_citations".to_string(),
            description: "Look up several legal citations at once in CourtListener.".to_string(),
            input_schema: json_schema_object(json!({ "citations": citations }), vec!["citations"]),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: BatchArgs = parse_args("batch_lookup_citations", arguments)?;
        let citations: Vec<String> = args
            .citations
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if citations.is_empty() || citations.len() > MAX_BATCH {
            bail!(
                "citations must contain between 1 and {} entries, got {}",
                MAX_BATCH,
                citations.len()
            );
        }
        info!(tool = "batch_lookup_citations", count = citations.len(), "Looking up citations");

        let results = self
            .ctx
            .courtlistener
            .citations()
            .batch_lookup(&citations)
            .await?;
        Ok(CallToolResult::json(&serde_json::to_value(&results)?))
    }
}

/// Check whether a string is a well-formed citation.
pub struct VerifyFormatTool;

#[async_trait::async_trait]
impl Tool for VerifyFormatTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "verify_citation_format".to_string(),
            description: "Check whether a citation is in a recognized legal citation format, \
                          and report the template, normalized form and any formatting issues."
                .to_string(),
            input_schema: citation_schema("The citation to verify"),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: CitationArgs = parse_args("verify_citation_format", arguments)?;
        info!(tool = "verify_citation_format", citation = %args.citation, "Verifying citation");
        let verification = citation::verify(&args.citation);
        Ok(CallToolResult::json(&serde_json::to_value(&verification)?))
    }
}

/// Parse one citation into its parts.
pub struct ParseCitationTool;

#[async_trait::async_trait]
impl Tool for ParseCitationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "parse_citation".to_string(),
            description: "Parse a legal citation into structured parts (volume, reporter, page, \
                          court, year) with a normalized form and a link to the source when one \
                          is known. Covers case reporters, Westlaw, Lexis, the U.S. Code and the CFR."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "citation": json_schema_string("The citation to parse"),
                    "broad": json_schema_boolean(
                        "Accept informal spacing, punctuation and case, and citations embedded in text",
                        true
                    )
                }),
                vec!["citation"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ParseArgs = parse_args("parse_citation", arguments)?;
        let text = require_text("citation", &args.citation)?;
        let mode = if args.broad {
            MatchMode::Broad
        } else {
            MatchMode::Strict
        };
        info!(tool = "parse_citation", citation = text, mode = mode.as_str(), "Parsing citation");

        let result = match citation::parse(text, mode) {
            Some(parsed) => json!({
                "success": true,
                "citation": args.citation,
                "parsed": parsed,
            }),
            None => json!({
                "success": false,
                "citation": args.citation,
                "error": "Citation not recognized",
                "suggestion": "Try a standard format such as '410 U.S. 113' or '42 U.S.C. § 1983'",
            }),
        };
        Ok(CallToolResult::json(&result))
    }
}

/// Find every citation in a block of text.
pub struct ExtractCitationsTool;

#[async_trait::async_trait]
impl Tool for ExtractCitationsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "extract_citations_from_text".to_string(),
            description: "Extract all legal citations from a block of text, including 'Id.' \
                          short forms resolved against the preceding citation."
                .to_string(),
            input_schema: json_schema_object(
                json!({ "text": json_schema_string("Text containing legal citations") }),
                vec!["text"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ExtractArgs = parse_args("extract_citations_from_text", arguments)?;
        let citations = citation::extract(&args.text);
        info!(
            tool = "extract_citations_from_text",
            text_length = args.text.len(),
            found = citations.len(),
            "Extracted citations"
        );
        Ok(CallToolResult::json(&json!({
            "total_citations": citations.len(),
            "citations": citations,
            "text_length": args.text.chars().count(),
        })))
    }
}

/// Local parse combined with a CourtListener lookup.
pub struct EnhancedLookupTool {
    ctx: Arc<ToolContext>,
}

impl EnhancedLookupTool {
    fn analysis(parsed: &Option<Citation>) -> Value {
        match parsed {
            Some(parsed) => {
                let mut value = json!({ "success": true });
                if let (Some(map), Ok(Value::Object(fields))) =
                    (value.as_object_mut(), serde_json::to_value(parsed))
                {
                    map.extend(fields);
                }
                value
            }
            None => json!({
                "success": false,
                "error": "Citation not recognized",
            }),
        }
    }

    async fn courtlistener_data(&self, text: &str, include: bool) -> Value {
        let client = &self.ctx.courtlistener;
        if !client.has_api_key() {
            return json!({
                "success": false,
                "error": "COURTLISTENER_API_KEY is not set",
            });
        }
        if !include {
            return json!({});
        }
        match client.citations().lookup(text).await {
            Ok(results) => json!({ "success": true, "data": results }),
            Err(e) => {
                warn!(citation = text, error = %e, "Citation lookup failed");
                json!({ "success": false, "error": e.to_string() })
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for EnhancedLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "enhanced_citation_lookup".to_string(),
            description: "Parse a citation locally and look it up in CourtListener, combining \
                          the structured parts and link with the matching cases."
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "citation": json_schema_string("The citation to look up and analyze"),
                    "include_courtlistener": json_schema_boolean(
                        "Also query the CourtListener citation lookup API",
                        true
                    )
                }),
                vec!["citation"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: EnhancedArgs = parse_args("enhanced_citation_lookup", arguments)?;
        let text = require_text("citation", &args.citation)?;
        info!(tool = "enhanced_citation_lookup", citation = text, "Enhanced citation lookup");

        let parsed = citation::parse(text, MatchMode::Broad);
        let analysis = Self::analysis(&parsed);
        let courtlistener = self.courtlistener_data(text, args.include_courtlistener).await;

        let courtlistener_ok = courtlistener["success"] == true;
        let combined = match (&parsed, courtlistener_ok) {
            (Some(parsed), true) => json!({
                "has_both_sources": true,
                "url": parsed.url,
                "canonical_citation": parsed.canonical,
                "tokens": parsed.tokens,
                "courtlistener_matches": courtlistener["data"].as_array().map_or(0, Vec::len),
            }),
            _ => {
                let mut sources = Vec::new();
                if parsed.is_some() {
                    sources.push("citation_parser");
                }
                if courtlistener_ok {
                    sources.push("courtlistener");
                }
                json!({ "has_both_sources": false, "available_sources": sources })
            }
        };

        Ok(CallToolResult::json(&json!({
            "citation": args.citation,
            "citation_analysis": analysis,
            "courtlistener_data": courtlistener,
            "combined_info": combined,
        })))
    }
}

/// Register the citation tools.
pub fn register(registry: &mut ToolRegistry, ctx: &Arc<ToolContext>) {
    registry.register(Arc::new(LookupCitationTool { ctx: ctx.clone() }));
    registry.register(Arc::new(BatchLookupTool { ctx: ctx.clone() }));
    registry.register(Arc::new(VerifyFormatTool));
    registry.register(Arc::new(ParseCitationTool));
    registry.register(Arc::new(ExtractCitationsTool));
    registry.register(Arc::new(EnhancedLookupTool { ctx: ctx.clone() }));
}
