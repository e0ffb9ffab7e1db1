use crate::errors::ToolError;
use crate::managers::resources::parse_args;
use crate::services::executor::{ExecMode, RequestExecutor};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngestArgs {
    namespace: String,
    data_type: String,
    records: Vec<Map<String, Value>>,
}

/// Body of the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatch {
    pub namespace: String,
    pub data_type: String,
    pub records: Vec<Map<String, Value>>,
}

pub struct IngestHandler {
    logger: Logger,
    validation: Validation,
    executor: Arc<RequestExecutor>,
}

impl IngestHandler {
    pub fn new(logger: Logger, validation: Validation, executor: Arc<RequestExecutor>) -> Self {
        Self {
            logger: logger.child("ingest"),
            validation,
            executor,
        }
    }

    fn build_batch(&self, args: IngestArgs) -> Result<IngestBatch, ToolError> {
        let namespace = self.validation.ensure_non_empty(&args.namespace, "namespace")?;
        let data_type = self.validation.ensure_non_empty(&args.data_type, "data_type")?;
        Ok(IngestBatch {
            namespace: namespace.to_string(),
            data_type: data_type.to_string(),
            records: args.records,
        })
    }
}

#[async_trait]
impl ToolHandler for IngestHandler {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let args: IngestArgs = parse_args("ingest_data", args)?;
        let batch = self.build_batch(args)?;
        self.logger.info(
            "ingesting records",
            Some(&serde_json::json!({
                "namespace": batch.namespace,
                "data_type": batch.data_type,
                "records": batch.records.len(),
            })),
        );
        Ok(self.executor.execute(&batch, ExecMode::Ingestion).await?)
    }
}
