use crate::errors::ClientError;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Denied,
    NotFound,
    Timeout,
    Retryable,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Retryable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }

    /// Text shown to the caller when a tool call fails.
    pub fn display_text(&self) -> String {
        let mut text = format!("Error: {}", self.message);
        if let Some(hint) = &self.hint {
            text.push_str("\nHint: ");
            text.push_str(hint);
        }
        text
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

impl From<ClientError> for ToolError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::Configuration(_) => {
                ToolError::new(ToolErrorKind::Internal, "CONFIGURATION_ERROR", message).with_hint(
                    "Set RISKGRAPH_API_KEY, or RISKGRAPH_USERNAME and RISKGRAPH_PASSWORD.",
                )
            }
            ClientError::Authentication(_) => {
                ToolError::new(ToolErrorKind::Denied, "AUTHENTICATION_ERROR", message)
            }
            ClientError::Validation(_) => {
                ToolError::new(ToolErrorKind::InvalidParams, "VALIDATION_ERROR", message)
            }
            ClientError::RemoteQuery(_) => {
                ToolError::new(ToolErrorKind::Internal, "REMOTE_QUERY_ERROR", message)
            }
            ClientError::EmptyResult(_) => {
                ToolError::new(ToolErrorKind::NotFound, "EMPTY_RESULT", message)
            }
            ClientError::Network { timed_out: true, .. } => {
                ToolError::new(ToolErrorKind::Timeout, "NETWORK_ERROR", message)
            }
            ClientError::Network { .. } => {
                ToolError::new(ToolErrorKind::Retryable, "NETWORK_ERROR", message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_stable_codes() {
        let cases = [
            (ClientError::configuration("x"), "CONFIGURATION_ERROR", ToolErrorKind::Internal),
            (ClientError::authentication("x"), "AUTHENTICATION_ERROR", ToolErrorKind::Denied),
            (ClientError::validation("x"), "VALIDATION_ERROR", ToolErrorKind::InvalidParams),
            (ClientError::remote_query("x"), "REMOTE_QUERY_ERROR", ToolErrorKind::Internal),
            (ClientError::empty_result("x"), "EMPTY_RESULT", ToolErrorKind::NotFound),
            (ClientError::network("x"), "NETWORK_ERROR", ToolErrorKind::Retryable),
            (ClientError::timeout("x"), "NETWORK_ERROR", ToolErrorKind::Timeout),
        ];
        for (err, code, kind) in cases {
            let mapped = ToolError::from(err);
            assert_eq!(mapped.code, code);
            assert_eq!(mapped.kind, kind);
        }
    }

    #[test]
    fn display_text_is_prefixed() {
        let err = ToolError::from(ClientError::remote_query("bad field"));
        assert_eq!(err.display_text(), "Error: GraphQL errors: bad field");
        assert!(!err.retryable);
        assert!(ToolError::from(ClientError::network("reset")).retryable);
    }
}
