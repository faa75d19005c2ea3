use super::SESSION_HEADER;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use courtlistener_mcp::server::SERVER_NAME;
use courtlistener_mcp::McpServer;
use serde_json::Value;
use std::sync::Arc;

/// One JSON-RPC message per POST. Notifications get `202 Accepted`.
pub async fn mcp_message(State(server): State<Arc<McpServer>>, body: String) -> Response {
    let Some(response) = server.handle_message(&body).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let initialized = response.error.is_none() && is_initialize(&body);
    let mut http = Json(response).into_response();
    if initialized {
        let session = uuid::Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&session) {
            tracing::info!(session = %session, "MCP session started");
            http.headers_mut().insert(SESSION_HEADER, value);
        }
    }
    http
}

fn is_initialize(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("method").and_then(Value::as_str).map(|m| m == "initialize"))
        .unwrap_or(false)
}

/// Liveness check for load balancers and containers
pub async fn health(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "tools_available": server.registry().len(),
        "initialized": server.is_initialized(),
    }))
}
