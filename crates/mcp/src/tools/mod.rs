pub mod args;
pub mod citation;
pub mod ecfr;
pub mod get;
pub mod search;
pub mod status;
mod registry;

pub use citation::{
    BatchLookupTool, EnhancedLookupTool, ExtractCitationsTool, LookupCitationTool,
    ParseCitationTool, VerifyFormatTool,
};
pub use ecfr::{EcfrOperation, EcfrTool};
pub use get::{GetTool, RecordKind};
pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_id,
    json_schema_integer, json_schema_object, json_schema_string, Tool, ToolRegistry,
};
pub use search::{SearchKind, SearchTool};
pub use status::StatusTool;

use crate::context::ToolContext;
use std::sync::Arc;

/// Build a registry holding every tool family. `status` goes last so it can
/// report the final tool count.
pub fn register_all(ctx: &Arc<ToolContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    search::register(&mut registry, ctx);
    get::register(&mut registry, ctx);
    citation::register(&mut registry, ctx);
    ecfr::register(&mut registry, ctx);
    status::register(&mut registry, ctx);
    registry
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_names() {
        let ctx = Arc::new(testing::context("http://127.0.0.1:9/"));
        let registry = register_all(&ctx);
        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();

        assert_eq!(names.len(), 28);
        assert_eq!(names.first().map(String::as_str), Some("opinions"));
        assert_eq!(names.last().map(String::as_str), Some("status"));
        for name in [
            "semantic_search",
            "audio_by_id",
            "court",
            "lookup_citation",
            "enhanced_citation_lookup",
            "ecfr_get_section",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
    }
}
