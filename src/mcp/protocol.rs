use crate::errors::McpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// `params` of a `tools/call` request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, err: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: err.code.as_i32(),
                message: err.message,
            }),
        }
    }
}

/// MCP tool result carrying a single text block.
pub fn text_result(text: String, is_error: bool) -> Value {
    let mut result = serde_json::json!({
        "content": [ { "type": "text", "text": text } ]
    });
    if is_error {
        result["isError"] = Value::Bool(true);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn request_allows_missing_id_for_notifications() {
        let raw = r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(raw).expect("must parse");
        assert!(parsed.id.is_none());
        assert_eq!(parsed.method, "notifications/initialized");
    }

    #[test]
    fn tool_call_params_default_arguments() {
        let params: ToolCallParams =
            serde_json::from_value(serde_json::json!({"name": "query_assets"})).expect("params");
        assert_eq!(params.name, "query_assets");
        assert!(params.arguments.is_null());
    }

    #[test]
    fn failure_serializes_code() {
        let response = JsonRpcResponse::failure(
            serde_json::json!(7),
            McpError::new(ErrorCode::MethodNotFound, "Method not found"),
        );
        let value = serde_json::to_value(&response).expect("json");
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn error_results_are_flagged() {
        let value = text_result("Error: boom".to_string(), true);
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["text"], "Error: boom");
        assert!(text_result("ok".to_string(), false).get("isError").is_none());
    }
}
