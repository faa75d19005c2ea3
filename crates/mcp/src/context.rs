//! Shared state handed to every tool.

use courtlistener_sdk::{CourtListenerClient, EcfrClient};
use std::time::Instant;

/// How the server is reachable, reported by the status tool.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// `stdio` or `http`.
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub started_at: Instant,
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8785,
            environment: "production".to_string(),
            started_at: Instant::now(),
        }
    }
}

/// Upstream clients and runtime facts, read-only after startup.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub courtlistener: CourtListenerClient,
    pub ecfr: EcfrClient,
    pub runtime: RuntimeInfo,
}

impl ToolContext {
    pub fn new(courtlistener: CourtListenerClient, ecfr: EcfrClient, runtime: RuntimeInfo) -> Self {
        Self {
            courtlistener,
            ecfr,
            runtime,
        }
    }
}
