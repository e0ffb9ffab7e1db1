use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::protocol::{text_result, JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "riskgraph";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"list": true, "call": true}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": self.app.list_operations() })
    }

    /// Tool failures become `isError` results; only a malformed call is a protocol error.
    pub async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|err| McpError::new(ErrorCode::InvalidParams, err.to_string()))?;
        if params.name.is_empty() {
            return Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"));
        }
        match self.app.invoke(&params.name, params.arguments).await {
            Ok(payload) => {
                let text = serde_json::to_string_pretty(&payload)
                    .map_err(|err| McpError::new(ErrorCode::InternalError, err.to_string()))?;
                Ok(text_result(text, false))
            }
            Err(err) => {
                self.app.logger.warn(
                    "tool call failed",
                    Some(&serde_json::json!({
                        "tool": params.name,
                        "code": err.code,
                        "message": err.message,
                    })),
                );
                Ok(text_result(err.display_text(), true))
            }
        }
    }

    /// Dispatches one request. `None` means nothing is written back.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") && request.id.is_none() {
            return None;
        }
        let id = request.id?;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" | "notifications/initialized" => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => match self.handle_tools_call(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(id, err),
            },
            _ => JsonRpcResponse::failure(
                id,
                McpError::new(ErrorCode::MethodNotFound, "Method not found"),
            ),
        };
        Some(response)
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let parsed: Value = match serde_json::from_str(trimmed) {
                Ok(value) => value,
                Err(_) => {
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        McpError::new(ErrorCode::ParseError, "Parse error"),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let request: JsonRpcRequest = match serde_json::from_value(parsed) {
                Ok(req) => req,
                Err(_) => {
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        McpError::new(ErrorCode::InvalidRequest, "Invalid request"),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request).await {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), ToolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response).unwrap_or_default();
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let app = Arc::new(App::initialize()?);
    McpServer::new(app).run_stdio().await
}
