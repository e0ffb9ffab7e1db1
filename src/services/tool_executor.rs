use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
    alias_map: HashMap<String, String>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
        alias_map: HashMap<String, String>,
    ) -> Self {
        Self {
            logger: logger.child("tools"),
            handlers: Arc::new(handlers),
            alias_map,
        }
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    /// Canonical tool name, or `None` when neither a handler nor an alias matches.
    pub fn resolve(&self, tool: &str) -> Option<String> {
        if self.handlers.contains_key(tool) {
            return Some(tool.to_string());
        }
        self.alias_map
            .get(tool)
            .filter(|target| self.handlers.contains_key(target.as_str()))
            .cloned()
    }

    fn unknown_tool(&self, tool: &str) -> ToolError {
        let mut known: Vec<String> = self.handlers.keys().cloned().collect();
        known.sort();
        let suggestions = suggest(tool, &known, 3);
        let mut err = ToolError::not_found(format!("Unknown tool: {}", tool))
            .with_details(serde_json::json!({ "known_tools": known, "did_you_mean": suggestions }));
        if !suggestions.is_empty() {
            err = err.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
        }
        err
    }

    /// Runs the handler and wraps its output as `{ result, meta }`.
    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let canonical = self.resolve(tool).ok_or_else(|| self.unknown_tool(tool))?;
        let handler = self
            .handlers
            .get(&canonical)
            .cloned()
            .ok_or_else(|| self.unknown_tool(tool))?;

        let trace_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.debug(
            "tool call",
            Some(&serde_json::json!({ "tool": canonical, "trace_id": trace_id, "args": args })),
        );

        let outcome = handler.handle(args).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                self.logger.info(
                    "tool call ok",
                    Some(&serde_json::json!({ "tool": canonical, "duration_ms": duration_ms })),
                );
                let invoked_as = if canonical != tool {
                    Value::String(tool.to_string())
                } else {
                    Value::Null
                };
                Ok(serde_json::json!({
                    "result": result,
                    "meta": {
                        "tool": canonical,
                        "invoked_as": invoked_as,
                        "duration_ms": duration_ms,
                        "trace_id": trace_id,
                    }
                }))
            }
            Err(err) => {
                self.logger.warn(
                    "tool call failed",
                    Some(&serde_json::json!({
                        "tool": canonical,
                        "code": err.code,
                        "message": err.message,
                        "duration_ms": duration_ms,
                        "trace_id": trace_id,
                    })),
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, args: Value) -> Result<Value, ToolError> {
            Ok(args)
        }
    }

    fn executor() -> ToolExecutor {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("query_assets".to_string(), Arc::new(Echo));
        let aliases = HashMap::from([("assets".to_string(), "query_assets".to_string())]);
        ToolExecutor::new(Logger::new("test"), handlers, aliases)
    }

    #[tokio::test]
    async fn wraps_result_with_meta() {
        let payload = executor()
            .execute("assets", serde_json::json!({"limit": 5}))
            .await
            .expect("payload");
        assert_eq!(payload["result"]["limit"], 5);
        assert_eq!(payload["meta"]["tool"], "query_assets");
        assert_eq!(payload["meta"]["invoked_as"], "assets");
    }

    #[tokio::test]
    async fn unknown_tool_suggests_close_match() {
        let err = executor()
            .execute("query_asset", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.hint.as_deref(), Some("Did you mean: query_assets?"));
    }
}
