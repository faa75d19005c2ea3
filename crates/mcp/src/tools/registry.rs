// Tool trait, registry and schema helpers

use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments.
    ///
    /// An `Err` is reported to the client as an error result, never as a
    /// protocol error.
    async fn execute(&self, arguments: Value) -> Result<CallToolResult>;
}

/// Tool registry, listed in registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. A later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| self.tools[slot].clone())
    }

    /// List all tool schemas
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// String restricted to `values`, with the first value as default.
pub fn json_schema_enum(description: &str, values: &[&str]) -> Value {
    json!({
        "type": "string",
        "description": description,
        "enum": values,
        "default": values.first()
    })
}

pub fn json_schema_integer(description: &str, minimum: i64, maximum: Option<i64>) -> Value {
    let mut schema = json!({
        "type": "integer",
        "description": description,
        "minimum": minimum
    });
    if let Some(maximum) = maximum {
        schema["maximum"] = json!(maximum);
    }
    schema
}

/// Integer id that may also arrive as a numeric string.
pub fn json_schema_id(description: &str) -> Value {
    json!({
        "type": ["integer", "string"],
        "description": description
    })
}

pub fn json_schema_boolean(description: &str, default: bool) -> Value {
    json!({
        "type": "boolean",
        "description": description,
        "default": default
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    json!({
        "type": "array",
        "items": items,
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static str);

    #[async_trait::async_trait]
    impl Tool for Named {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.to_string(),
                description: self.1.to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
            Ok(CallToolResult::text(self.1))
        }
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("opinions", "a")));
        registry.register(Arc::new(Named("dockets", "b")));
        registry.register(Arc::new(Named("audio", "c")));

        let names: Vec<_> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["opinions", "dockets", "audio"]);
        assert!(registry.contains("dockets"));
        assert!(registry.get("people").is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("status", "old")));
        registry.register(Arc::new(Named("status", "new")));

        assert_eq!(registry.len(), 1);
        let result = registry
            .get("status")
            .unwrap()
            .execute(Value::Null)
            .await
            .unwrap();
        assert_eq!(result.text_content(), "new");
    }

    #[test]
    fn test_integer_schema_bounds() {
        let schema = json_schema_integer("Maximum results", 1, Some(100));
        assert_eq!(schema["minimum"], 1);
        assert_eq!(schema["maximum"], 100);
        assert!(json_schema_integer("Page", 1, None).get("maximum").is_none());
    }
}
