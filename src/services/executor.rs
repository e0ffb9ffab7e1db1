use crate::constants::{endpoints::API_KEY_HEADER, limits::ERROR_BODY_PREVIEW_BYTES, network};
use crate::errors::ClientError;
use crate::queries::QueryDocument;
use crate::services::config::ClientConfig;
use crate::services::logger::Logger;
use crate::services::session::{AuthHeaders, SessionManager};
use crate::utils::redact::redact_text;
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which remote surface a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// GraphQL endpoint; payload is the `data` member.
    Query,
    /// Ingestion endpoint; payload is the whole JSON body.
    Ingestion,
}

impl ExecMode {
    fn as_str(self) -> &'static str {
        match self {
            ExecMode::Query => "query",
            ExecMode::Ingestion => "ingestion",
        }
    }
}

enum Attempt {
    Done(Value),
    Unauthorized(String),
}

pub struct RequestExecutor {
    logger: Logger,
    config: Arc<ClientConfig>,
    client: Client,
    sessions: Arc<SessionManager>,
}

impl RequestExecutor {
    pub fn new(
        logger: Logger,
        config: Arc<ClientConfig>,
        client: Client,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            config,
            client,
            sessions,
        }
    }

    /// Shared HTTP client with bounded connect and total timeouts.
    pub fn build_client(config: &ClientConfig) -> Result<Client, ClientError> {
        Client::builder()
            .user_agent(network::USER_AGENT)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ClientError::configuration(format!("Failed to build HTTP client: {}", err)))
    }

    pub async fn execute_query(&self, document: &QueryDocument) -> Result<Value, ClientError> {
        self.execute(document, ExecMode::Query).await
    }

    /// Sends `body` with a valid session. A 401 invalidates the session and
    /// the request is replayed once; a second 401 is final.
    pub async fn execute<B>(&self, body: &B, mode: ExecMode) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut retried = false;
        loop {
            let auth = self.sessions.ensure_valid_session().await?;
            match self.send_once(body, mode, &auth).await? {
                Attempt::Done(payload) => return Ok(payload),
                Attempt::Unauthorized(message) if retried => {
                    self.logger.error(
                        "still unauthorized after re-authentication",
                        Some(&serde_json::json!({ "mode": mode.as_str() })),
                    );
                    return Err(ClientError::authentication(message));
                }
                Attempt::Unauthorized(message) => {
                    self.logger.warn(
                        "unauthorized, re-authenticating once",
                        Some(&serde_json::json!({ "mode": mode.as_str(), "message": message })),
                    );
                    self.sessions.invalidate();
                    retried = true;
                }
            }
        }
    }

    async fn send_once<B>(
        &self,
        body: &B,
        mode: ExecMode,
        auth: &AuthHeaders,
    ) -> Result<Attempt, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = match mode {
            ExecMode::Query => self.config.graphql_url(),
            ExecMode::Ingestion => self.config.ingest_url(),
        };
        let mut headers = auth.to_header_map()?;
        if mode == ExecMode::Ingestion {
            if let Some(key) = self.config.api_key.as_deref() {
                let value = HeaderValue::from_str(key).map_err(|_| {
                    ClientError::configuration("API key contains characters not allowed in a header")
                })?;
                headers.insert(API_KEY_HEADER, value);
            }
        }

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        self.logger.debug(
            "request finished",
            Some(&serde_json::json!({
                "mode": mode.as_str(),
                "status": status.as_u16(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        interpret_response(status, &text, mode)
    }
}

fn interpret_response(status: StatusCode, text: &str, mode: ExecMode) -> Result<Attempt, ClientError> {
    let parsed: Option<Value> = serde_json::from_str(text).ok();

    if status == StatusCode::UNAUTHORIZED {
        let message = parsed
            .as_ref()
            .and_then(remote_message)
            .unwrap_or_else(|| "remote service rejected the credential (HTTP 401)".to_string());
        return Ok(Attempt::Unauthorized(message));
    }

    if !status.is_success() {
        let message = parsed
            .as_ref()
            .and_then(remote_message)
            .map(|msg| format!("HTTP {}: {}", status.as_u16(), msg))
            .unwrap_or_else(|| {
                let preview = redact_text(text.trim(), ERROR_BODY_PREVIEW_BYTES);
                if preview.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    format!("HTTP {}: {}", status, preview)
                }
            });
        return Err(ClientError::network(message));
    }

    if parsed.is_none() && !text.trim().is_empty() {
        let preview = redact_text(text.trim(), ERROR_BODY_PREVIEW_BYTES);
        return Err(ClientError::network(format!(
            "HTTP {}: {} response was not JSON: {}",
            status.as_u16(),
            mode.as_str(),
            preview
        )));
    }

    let Some(body) = parsed.filter(|v| !v.is_null()) else {
        return Err(ClientError::empty_result(format!(
            "{} response had no payload",
            mode.as_str()
        )));
    };

    if let Some(messages) = inline_errors(&body) {
        return Err(ClientError::remote_query(messages));
    }

    let payload = match mode {
        ExecMode::Query => body.get("data").cloned().unwrap_or(Value::Null),
        ExecMode::Ingestion => body,
    };
    if payload.is_null() {
        return Err(ClientError::empty_result(format!(
            "{} response had no data",
            mode.as_str()
        )));
    }
    Ok(Attempt::Done(payload))
}

/// Joined messages of a non-empty `errors` array.
fn inline_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = errors
        .iter()
        .map(|err| {
            err.get("message")
                .and_then(Value::as_str)
                .or_else(|| err.as_str())
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect();
    Some(messages.join("; "))
}

/// Most specific human-readable message in a remote error body.
pub(crate) fn remote_message(body: &Value) -> Option<String> {
    if let Some(joined) = inline_errors(body) {
        return Some(joined);
    }
    for key in ["message", "error_description", "detail"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
    }
    match body.get("error") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(result: Result<Attempt, ClientError>) -> Value {
        match result {
            Ok(Attempt::Done(value)) => value,
            Ok(Attempt::Unauthorized(msg)) => panic!("unexpected 401: {}", msg),
            Err(err) => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn query_payload_is_data_member_unchanged() {
        let value = done(interpret_response(
            StatusCode::OK,
            r#"{"data":{"assets":[{"id":"a1","extra":{"x":1}}]}}"#,
            ExecMode::Query,
        ));
        assert_eq!(value, serde_json::json!({"assets":[{"id":"a1","extra":{"x":1}}]}));
    }

    #[test]
    fn inline_errors_are_joined() {
        let err = interpret_response(
            StatusCode::OK,
            r#"{"data":null,"errors":[{"message":"bad field"},{"message":"bad arg","path":["x"]}]}"#,
            ExecMode::Query,
        )
        .err()
        .expect("error");
        assert_eq!(err, ClientError::remote_query("bad field; bad arg"));
    }

    #[test]
    fn missing_data_is_empty_result() {
        let err = interpret_response(StatusCode::OK, r#"{"data":null}"#, ExecMode::Query)
            .err()
            .expect("error");
        assert!(matches!(err, ClientError::EmptyResult(_)));
        let err = interpret_response(StatusCode::OK, "", ExecMode::Ingestion)
            .err()
            .expect("error");
        assert!(matches!(err, ClientError::EmptyResult(_)));
    }

    #[test]
    fn non_json_success_body_is_a_network_error() {
        let err = interpret_response(
            StatusCode::OK,
            "<html><body>Proxy login token=abcdef123456</body></html>",
            ExecMode::Query,
        )
        .err()
        .expect("error");
        let (message, timed_out) = match err {
            ClientError::Network { message, timed_out } => (message, timed_out),
            other => panic!("expected network error, got {:?}", other),
        };
        assert!(!timed_out);
        assert!(message.starts_with("HTTP 200: query response was not JSON"), "{}", message);
        assert!(message.contains("<html>"), "{}", message);
        assert!(!message.contains("abcdef123456"), "{}", message);
    }

    #[test]
    fn ingestion_payload_is_whole_body() {
        let value = done(interpret_response(
            StatusCode::ACCEPTED,
            r#"{"accepted":0,"batchId":"b-1"}"#,
            ExecMode::Ingestion,
        ));
        assert_eq!(value["batchId"], "b-1");
    }

    #[test]
    fn unauthorized_is_signalled_not_failed() {
        let result = interpret_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"token expired"}"#,
            ExecMode::Query,
        );
        assert!(matches!(result, Ok(Attempt::Unauthorized(ref msg)) if msg == "token expired"));
    }

    #[test]
    fn other_http_failures_prefer_remote_message() {
        let err = interpret_response(
            StatusCode::BAD_GATEWAY,
            r#"{"error":{"message":"upstream unavailable"}}"#,
            ExecMode::Query,
        )
        .err()
        .expect("error");
        assert_eq!(err, ClientError::network("HTTP 502: upstream unavailable"));

        let err = interpret_response(StatusCode::FORBIDDEN, "", ExecMode::Query)
            .err()
            .expect("error");
        assert_eq!(err, ClientError::network("HTTP 403 Forbidden"));
    }
}
