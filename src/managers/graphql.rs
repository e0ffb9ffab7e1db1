use crate::errors::ToolError;
use crate::managers::resources::parse_args;
use crate::queries::QueryDocument;
use crate::services::executor::RequestExecutor;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQueryArgs {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    variables: Option<Map<String, Value>>,
}

/// `execute_graphql`: the caller's document is sent as written.
pub struct RawQueryHandler {
    logger: Logger,
    validation: Validation,
    executor: Arc<RequestExecutor>,
}

impl RawQueryHandler {
    pub fn new(logger: Logger, validation: Validation, executor: Arc<RequestExecutor>) -> Self {
        Self {
            logger: logger.child("graphql"),
            validation,
            executor,
        }
    }
}

#[async_trait]
impl ToolHandler for RawQueryHandler {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let args: RawQueryArgs = parse_args("execute_graphql", args)?;
        let query = args.query.unwrap_or_default();
        self.validation.ensure_read_only_query(&query)?;
        let document = QueryDocument {
            query,
            variables: args.variables,
        };
        self.logger.debug(
            "raw query",
            Some(&serde_json::json!({ "length": document.query.len() })),
        );
        Ok(self.executor.execute_query(&document).await?)
    }
}
