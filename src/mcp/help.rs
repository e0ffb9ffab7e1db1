use crate::errors::ToolError;
use crate::mcp::aliases::BUILTIN_TOOL_ALIASES;
use crate::mcp::catalog::{tool_by_name, tool_catalog};
use crate::services::tool_executor::ToolHandler;
use crate::utils::suggest::suggest;
use async_trait::async_trait;
use serde_json::Value;

const OVERVIEW: &str = "Read-only access to the risk platform's GraphQL API plus record ingestion. \
Structured query tools build the GraphQL document for you; execute_graphql sends your own.";

/// Builtin `help` tool. Never touches the network.
pub struct HelpHandler {
    credentials: &'static str,
}

impl HelpHandler {
    pub fn new(credentials: &'static str) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl ToolHandler for HelpHandler {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        if let Some(name) = args.get("tool").and_then(Value::as_str) {
            return describe_tool(name);
        }
        let tools: Vec<Value> = tool_catalog()
            .iter()
            .map(|tool| serde_json::json!({ "name": tool.name, "description": tool.description }))
            .collect();
        let aliases: serde_json::Map<String, Value> = BUILTIN_TOOL_ALIASES
            .iter()
            .map(|(alias, target)| (alias.to_string(), Value::String(target.to_string())))
            .collect();
        Ok(serde_json::json!({
            "overview": OVERVIEW,
            "credentials": self.credentials,
            "tools": tools,
            "aliases": aliases,
        }))
    }
}

fn describe_tool(name: &str) -> Result<Value, ToolError> {
    let canonical = crate::mcp::aliases::canonical_tool_name(name);
    match tool_by_name(canonical) {
        Some(tool) => Ok(serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "inputSchema": tool.input_schema,
        })),
        None => {
            let names: Vec<String> = tool_catalog().iter().map(|t| t.name.clone()).collect();
            let mut err = ToolError::not_found(format!("Unknown tool: {}", name));
            let suggestions = suggest(name, &names, 3);
            if !suggestions.is_empty() {
                err = err.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
            }
            Err(err)
        }
    }
}
