// Core types and text processing for the CourtListener MCP server

pub mod citation;
pub mod error;
pub mod regulation;
pub mod types;
pub mod xml;

pub use citation::{Citation, FormatVerification, MatchMode};
pub use error::{CoreError, CoreResult};
pub use regulation::{RegulationDocument, RegulationNode};
pub use types::*;
