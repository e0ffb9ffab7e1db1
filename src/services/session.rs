//! Credential lifecycle for outbound calls.
//!
//! One `SessionManager` owns at most one `Session`. A session is replaced as a
//! whole on refresh and dropped on invalidation; readers always see either the
//! old or the new value. Two callers that both observe a stale session will
//! both log in; the last writer wins and both credentials stay usable.

use crate::constants::auth::{API_KEY_HORIZON_SECS, SAFETY_MARGIN_SECS};
use crate::errors::ClientError;
use crate::services::config::{ClientConfig, CredentialSource};
use crate::services::executor::remote_message;
use crate::services::logger::Logger;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthMode {
    ApiKey,
    Password,
}

#[derive(Clone)]
pub struct Session {
    credential: String,
    expires_at: DateTime<Utc>,
    mode: AuthMode,
}

impl Session {
    fn api_key(key: &str, now: DateTime<Utc>) -> Self {
        Self {
            credential: key.to_string(),
            expires_at: now + Duration::seconds(API_KEY_HORIZON_SECS),
            mode: AuthMode::ApiKey,
        }
    }

    fn from_login(token: String, lifetime_secs: i64, now: DateTime<Utc>) -> Self {
        let usable = (lifetime_secs - SAFETY_MARGIN_SECS).max(0);
        Self {
            credential: token,
            expires_at: now + Duration::seconds(usable),
            mode: AuthMode::Password,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    fn headers(&self) -> AuthHeaders {
        AuthHeaders {
            bearer: self.credential.clone(),
            mode: self.mode,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Authorization material derived from the current session.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    bearer: String,
    mode: AuthMode,
}

impl AuthHeaders {
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let value = HeaderValue::from_str(&format!("Bearer {}", self.bearer)).map_err(|_| {
            ClientError::configuration("credential contains characters not allowed in a header")
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

const DEFAULT_LOGIN_LIFETIME_SECS: i64 = 3_600;

pub struct SessionManager {
    logger: Logger,
    config: Arc<ClientConfig>,
    client: Client,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(logger: Logger, config: Arc<ClientConfig>, client: Client) -> Self {
        Self {
            logger: logger.child("session"),
            config,
            client,
            session: Mutex::new(None),
        }
    }

    pub async fn ensure_valid_session(&self) -> Result<AuthHeaders, ClientError> {
        self.ensure_valid_session_at(Utc::now()).await
    }

    /// `ensure_valid_session` against an explicit clock reading.
    pub async fn ensure_valid_session_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<AuthHeaders, ClientError> {
        if let Some(session) = self.snapshot() {
            if session.is_valid_at(now) {
                return Ok(session.headers());
            }
            self.logger.debug(
                "session stale, refreshing",
                Some(&serde_json::json!({ "expired_at": session.expires_at.to_rfc3339() })),
            );
        }

        let fresh = match self.config.credential_source() {
            CredentialSource::ApiKey(key) => Session::api_key(key, now),
            CredentialSource::Password { username, password } => {
                self.login(username, password, now).await?
            }
            CredentialSource::Missing => {
                return Err(ClientError::configuration(
                    "no credentials configured: provide an API key or a username and password",
                ));
            }
        };
        let headers = fresh.headers();
        self.replace(Some(fresh));
        Ok(headers)
    }

    /// Drops the session so the next call re-authenticates. Safe when empty.
    pub fn invalidate(&self) {
        if self.replace(None).is_some() {
            self.logger.info("session invalidated", None);
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    fn replace(&self, next: Option<Session>) -> Option<Session> {
        let mut guard = self.session.lock().unwrap_or_else(|err| err.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, ClientError> {
        self.logger.info(
            "logging in",
            Some(&serde_json::json!({ "username": username })),
        );
        let response = self
            .client
            .post(self.config.login_url())
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|err| ClientError::authentication(ClientError::from(err).to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let detail = parsed
                .as_ref()
                .and_then(remote_message)
                .unwrap_or_else(|| format!("login returned HTTP {}", status.as_u16()));
            self.logger.warn(
                "login rejected",
                Some(&serde_json::json!({ "status": status.as_u16() })),
            );
            return Err(ClientError::authentication(detail));
        }

        let body: LoginResponse = parsed
            .map(serde_json::from_value::<LoginResponse>)
            .transpose()
            .map_err(|_| ClientError::authentication("login response was not valid JSON"))?
            .ok_or_else(|| ClientError::authentication("login response was empty"))?;
        let token = body
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClientError::authentication("login response did not include access_token"))?;
        let lifetime = body.expires_in.unwrap_or(DEFAULT_LOGIN_LIFETIME_SECS);

        let session = Session::from_login(token, lifetime, now);
        self.logger.debug(
            "login succeeded",
            Some(&serde_json::json!({ "expires_at": session.expires_at.to_rfc3339() })),
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_session_goes_stale_before_remote_expiry() {
        let now = Utc::now();
        let session = Session::from_login("t".into(), 3_600, now);
        assert_eq!(session.expires_at(), now + Duration::seconds(3_300));
        assert!(session.is_valid_at(now + Duration::seconds(3_299)));
        assert!(!session.is_valid_at(now + Duration::seconds(3_300)));
    }

    #[test]
    fn short_lifetimes_are_stale_immediately() {
        let now = Utc::now();
        let session = Session::from_login("t".into(), 120, now);
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn api_key_session_lasts_the_horizon() {
        let now = Utc::now();
        let session = Session::api_key("k", now);
        assert_eq!(session.mode(), AuthMode::ApiKey);
        assert!(session.is_valid_at(now + Duration::hours(23)));
        assert!(!session.is_valid_at(now + Duration::hours(24)));
    }

    #[test]
    fn headers_carry_bearer_credential() {
        let headers = Session::api_key("key-123", Utc::now()).headers();
        let map = headers.to_header_map().expect("headers");
        assert_eq!(map.get(AUTHORIZATION).unwrap(), "Bearer key-123");
        assert!(!format!("{:?}", headers).contains("key-123"));
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let config = Arc::new(ClientConfig::new("http://127.0.0.1:9").expect("config"));
        let manager = SessionManager::new(Logger::new("test"), config, Client::new());
        let err = manager.ensure_valid_session().await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn invalidate_without_session_is_a_no_op() {
        let config = Arc::new(
            ClientConfig::new("http://127.0.0.1:9")
                .expect("config")
                .with_api_key("k"),
        );
        let manager = SessionManager::new(Logger::new("test"), config, Client::new());
        manager.invalidate();
        manager.invalidate();
        assert!(manager.snapshot().is_none());
        manager.ensure_valid_session().await.expect("api key session");
        assert!(manager.snapshot().is_some());
        manager.invalidate();
        assert!(manager.snapshot().is_none());
    }
}
