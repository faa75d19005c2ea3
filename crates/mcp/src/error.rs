//! Error types for the MCP crate.

use crate::protocol::{error_codes, JsonRpcError};

/// Errors raised while serving MCP requests.
///
/// Tool failures are not represented here; they travel back to the client
/// as `CallToolResult` values with `isError` set.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Line exceeded the codec limit or was not UTF-8.
    #[error("Codec error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The requested tool is not registered.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Unknown prompt: {0}")]
    PromptNotFound(String),

    #[error("Unknown resource: {0}")]
    ResourceNotFound(String),

    /// Upstream request made on behalf of a resource read failed.
    #[error(transparent)]
    Upstream(#[from] courtlistener_sdk::Error),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            McpError::JsonParse(_) => error_codes::PARSE_ERROR,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_)
            | McpError::ToolNotFound(_)
            | McpError::PromptNotFound(_)
            | McpError::ResourceNotFound(_) => error_codes::INVALID_PARAMS,
            McpError::Transport(_) | McpError::Codec(_) | McpError::Upstream(_) => {
                error_codes::INTERNAL_ERROR
            }
        };
        JsonRpcError::custom(code, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_codes() {
        assert_eq!(
            McpError::MethodNotFound("x".into()).to_rpc_error().code,
            -32601
        );
        assert_eq!(McpError::ToolNotFound("x".into()).to_rpc_error().code, -32602);
        assert_eq!(
            McpError::ResourceNotFound("courtlistener://x".into())
                .to_rpc_error()
                .code,
            -32602
        );
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(McpError::JsonParse(parse).to_rpc_error().code, -32700);
    }
}
