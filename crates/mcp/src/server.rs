//! MCP server implementation.
//!
//! `McpServer` owns the tool registry and the shared upstream clients and
//! answers JSON-RPC messages. It takes `&self` everywhere so one instance can
//! serve the stdio loop or many concurrent HTTP requests.

use crate::context::ToolContext;
use crate::error::McpError;
use crate::protocol::*;
use crate::tools::{self, ToolRegistry};
use crate::transport::McpTransport;
use crate::{prompts, resources};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "CourtListener MCP Server";

pub const INSTRUCTIONS: &str = "Model Context Protocol server for the CourtListener legal \
database and the Electronic Code of Federal Regulations. Search tools (opinions, \
semantic_search, dockets, dockets_with_documents, recap_documents, audio, people) query \
case law, PACER dockets and filings, oral arguments and judges. Get tools (opinion, docket, \
audio_by_id, cluster, person, court) fetch single records by ID. Citation tools look up, \
verify, parse and extract legal citations. eCFR tools (ecfr_*) list titles and agencies, \
search regulations, and return structure, history and text. Use status to check the server.";

/// MCP server bridging the tool registry to MCP clients.
pub struct McpServer {
    registry: ToolRegistry,
    context: Arc<ToolContext>,
    server_name: String,
    server_version: String,
    instructions: String,
    initialized: AtomicBool,
}

impl McpServer {
    /// Server with every tool family registered.
    pub fn new(context: Arc<ToolContext>) -> Self {
        let registry = tools::register_all(&context);
        Self::with_registry(registry, context)
    }

    pub fn with_registry(registry: ToolRegistry, context: Arc<ToolContext>) -> Self {
        Self {
            registry,
            context,
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: INSTRUCTIONS.to_string(),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Whether a client has sent `initialize`. Requests are served either way.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Run the server loop until the transport closes.
    pub async fn run<T: McpTransport>(&self, transport: &mut T) -> Result<(), McpError> {
        info!(server = %self.server_name, tools = self.registry.len(), "MCP server starting");

        loop {
            let line = match transport.receive().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("Transport closed, shutting down");
                    break;
                }
                Err(McpError::Codec(e)) => {
                    warn!(error = %e, "Dropping unreadable message");
                    let response =
                        JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e.to_string()));
                    transport.send(&serde_json::to_string(&response)?).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!(message = %line, "Received message");
            if let Some(response) = self.handle_message(&line).await {
                let json = serde_json::to_string(&response)?;
                debug!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    McpError::JsonParse(e).to_rpc_error(),
                ));
            }
        };

        if raw.is_array() {
            return Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request("Batch requests are not supported"),
            ));
        }

        let id = raw.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    id.unwrap_or(Value::Null),
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request and produce a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            );
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => to_value(&ListToolsResult {
                tools: self.registry.list_schemas(),
            }),
            "tools/call" => self.handle_call_tool(request.params).await,
            "resources/list" => to_value(&ListResourcesResult {
                resources: Vec::new(),
            }),
            "resources/templates/list" => to_value(&ListResourceTemplatesResult {
                resource_templates: resources::templates(),
            }),
            "resources/read" => self.handle_read_resource(request.params).await,
            "prompts/list" => to_value(&ListPromptsResult {
                prompts: prompts::list(),
            }),
            "prompts/get" => params::<GetPromptParams>(request.params)
                .and_then(|p| prompts::get(&p.name, &p.arguments))
                .and_then(|r| to_value(&r)),
            method => {
                warn!(method, "Unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, e.to_rpc_error()),
        }
    }

    fn handle_notification(&self, notification: &JsonRpcRequest) {
        match notification.method.as_str() {
            "notifications/initialized" => info!("Client confirmed initialization"),
            "notifications/cancelled" => debug!("Client cancelled a request"),
            method => debug!(method, "Unknown notification, ignoring"),
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = match params {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => InitializeParams::default(),
        };
        info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            protocol = %params.protocol_version,
            "Handling initialize"
        );
        self.initialized.store(true, Ordering::Relaxed);

        to_value(&InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChanged {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
                prompts: Some(ListChanged {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
            instructions: Some(self.instructions.clone()),
        })
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let call: CallToolParams = self::params(params)?;
        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| McpError::ToolNotFound(call.name.clone()))?;

        debug!(tool = %call.name, "Handling tools/call");
        let result = match tool.execute(call.arguments).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(tool = %call.name, error = %message, "Tool call failed");
                CallToolResult::error(message)
            }
        };
        to_value(&result)
    }

    async fn handle_read_resource(&self, params: Option<Value>) -> Result<Value, McpError> {
        let read: ReadResourceParams = self::params(params)?;
        let result = resources::read(&self.context.courtlistener, &read.uri).await?;
        to_value(&result)
    }
}

fn params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, McpError> {
    Ok(serde_json::to_value(value)?)
}
