use crate::errors::{ClientError, ToolError};
use crate::queries::QuerySpec;
use crate::services::executor::RequestExecutor;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Serves one structured resource tool: args -> query -> document -> executor.
pub struct ResourceQueryHandler<T> {
    tool: &'static str,
    logger: Logger,
    executor: Arc<RequestExecutor>,
    _spec: PhantomData<fn() -> T>,
}

impl<T: QuerySpec> ResourceQueryHandler<T> {
    pub fn new(tool: &'static str, logger: Logger, executor: Arc<RequestExecutor>) -> Self {
        Self {
            tool,
            logger: logger.child(tool),
            executor,
            _spec: PhantomData,
        }
    }
}

/// Parses tool arguments; `null` means "no parameters".
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &str,
    args: Value,
) -> Result<T, ClientError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|err| ClientError::validation(format!("invalid arguments for {}: {}", tool, err)))
}

#[async_trait]
impl<T: QuerySpec + 'static> ToolHandler for ResourceQueryHandler<T> {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let spec: T = parse_args(self.tool, args)?;
        let document = spec.to_document()?;
        self.logger.debug(
            "document built",
            Some(&serde_json::json!({ "variables": document.variables })),
        );
        Ok(self.executor.execute_query(&document).await?)
    }
}
