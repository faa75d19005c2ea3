//! Model Context Protocol server for CourtListener and eCFR.
//!
//! Exposes search, record, citation and regulation tools plus research
//! prompts and `courtlistener://` resources over JSON-RPC.

pub mod context;
pub mod error;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use context::{RuntimeInfo, ToolContext};
pub use error::McpError;
pub use server::McpServer;
pub use transport::{ChannelTransport, McpTransport, StdioTransport};
