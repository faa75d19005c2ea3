use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use courtlistener_mcp::McpServer;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Header carrying the session id handed out on `initialize`.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Serve MCP over HTTP until Ctrl-C.
pub async fn serve(addr: &str, server: Arc<McpServer>) -> Result<()> {
    let app = create_router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP HTTP transport listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the MCP router
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handlers::mcp_message))
        .route("/mcp/", post(handlers::mcp_message))
        .route("/health", get(handlers::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(server)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use courtlistener_mcp::{RuntimeInfo, ToolContext};
    use courtlistener_sdk::{CourtListenerClient, EcfrClient};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        let context = ToolContext::new(
            CourtListenerClient::builder()
                .base_url("http://127.0.0.1:9/")
                .build()
                .unwrap(),
            EcfrClient::builder()
                .base_url("http://127.0.0.1:9/")
                .build()
                .unwrap(),
            RuntimeInfo::default(),
        );
        create_router(Arc::new(McpServer::new(Arc::new(context))))
    }

    fn post_mcp(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["tools_available"], 28);
    }

    #[tokio::test]
    async fn test_initialize_sets_session_header() {
        let response = router()
            .oneshot(post_mcp(
                "/mcp",
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "initialize",
                    "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SESSION_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["result"]["serverInfo"]["name"], "CourtListener MCP Server");
    }

    #[tokio::test]
    async fn test_tools_list_trailing_slash() {
        let response = router()
            .oneshot(post_mcp(
                "/mcp/",
                json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(SESSION_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["id"], "a");
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 28);
    }

    #[tokio::test]
    async fn test_notification_accepted() {
        let response = router()
            .oneshot(post_mcp(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{oops"))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32700);
    }
}
