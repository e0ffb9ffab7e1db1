use crate::errors::{ClientError, ToolError};
use crate::managers::graphql::RawQueryHandler;
use crate::managers::ingest::IngestHandler;
use crate::managers::resources::ResourceQueryHandler;
use crate::mcp::aliases::{builtin_tool_alias_map_owned, canonical_tool_name};
use crate::mcp::catalog::{tool_catalog, validate_tool_args, ToolDef};
use crate::mcp::help::HelpHandler;
use crate::queries::assets::AssetQuery;
use crate::queries::clusters::ClusterQuery;
use crate::queries::connectors::ConnectorQuery;
use crate::queries::data_models::DataModelQuery;
use crate::queries::findings::FindingQuery;
use crate::queries::risk_scores::RiskScoreQuery;
use crate::queries::tickets::TicketQuery;
use crate::queries::vulnerabilities::VulnerabilityQuery;
use crate::services::config::{ClientConfig, CredentialSource};
use crate::services::executor::RequestExecutor;
use crate::services::logger::Logger;
use crate::services::session::SessionManager;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Arc<ClientConfig>,
    pub sessions: Arc<SessionManager>,
    pub executor: Arc<RequestExecutor>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("every tool in tool_catalog.json must have a registered handler")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Builds the application from `RISKGRAPH_*` environment variables.
    pub fn initialize() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config, Logger::new("riskgraph"))
    }

    pub fn with_config(config: ClientConfig, logger: Logger) -> Result<Self, ClientError> {
        let config = Arc::new(config);
        let client = RequestExecutor::build_client(&config)?;
        let sessions = Arc::new(SessionManager::new(
            logger.clone(),
            config.clone(),
            client.clone(),
        ));
        let executor = Arc::new(RequestExecutor::new(
            logger.clone(),
            config.clone(),
            client,
            sessions.clone(),
        ));
        let validation = Validation::new();

        let credentials = match config.credential_source() {
            CredentialSource::ApiKey(_) => "api_key",
            CredentialSource::Password { .. } => "password",
            CredentialSource::Missing => "missing",
        };
        if credentials == "missing" {
            logger.warn(
                "no credentials configured; remote calls will fail until RISKGRAPH_API_KEY or RISKGRAPH_USERNAME/RISKGRAPH_PASSWORD is set",
                None,
            );
        }

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        macro_rules! resource {
            ($tool:literal, $spec:ty) => {
                handlers.insert(
                    $tool.to_string(),
                    Arc::new(ResourceQueryHandler::<$spec>::new(
                        $tool,
                        logger.clone(),
                        executor.clone(),
                    )),
                );
            };
        }
        resource!("query_assets", AssetQuery);
        resource!("query_vulnerabilities", VulnerabilityQuery);
        resource!("query_findings", FindingQuery);
        resource!("get_risk_scores", RiskScoreQuery);
        resource!("query_tickets", TicketQuery);
        resource!("query_connectors", ConnectorQuery);
        resource!("query_clusters", ClusterQuery);
        resource!("query_data_models", DataModelQuery);
        handlers.insert(
            "execute_graphql".to_string(),
            Arc::new(RawQueryHandler::new(
                logger.clone(),
                validation.clone(),
                executor.clone(),
            )),
        );
        handlers.insert(
            "ingest_data".to_string(),
            Arc::new(IngestHandler::new(
                logger.clone(),
                validation,
                executor.clone(),
            )),
        );
        handlers.insert("help".to_string(), Arc::new(HelpHandler::new(credentials)));

        Self::validate_tool_wiring(&handlers)
            .map_err(|err| ClientError::configuration(err.display_text()))?;

        let tool_executor = Arc::new(ToolExecutor::new(
            logger.clone(),
            handlers,
            builtin_tool_alias_map_owned(),
        ));

        logger.info(
            "riskgraph ready",
            Some(&serde_json::json!({
                "base_url": config.base_url,
                "credentials": credentials,
                "tools": tool_catalog().len(),
            })),
        );

        Ok(Self {
            logger,
            config,
            sessions,
            executor,
            tool_executor,
        })
    }

    pub fn list_operations(&self) -> Vec<ToolDef> {
        tool_catalog().clone()
    }

    /// Validates against the catalog schema, then dispatches.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let canonical = canonical_tool_name(name);
        validate_tool_args(canonical, &args)?;
        self.tool_executor.execute(name, args).await
    }
}
