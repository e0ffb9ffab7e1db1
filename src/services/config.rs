use crate::constants::{endpoints, env, network};
use crate::errors::ClientError;
use std::fmt;
use url::Url;

/// Where the session manager gets its credential from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource<'a> {
    ApiKey(&'a str),
    Password { username: &'a str, password: &'a str },
    Missing,
}

#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_key: None,
            username: None,
            password: None,
            timeout_ms: network::TIMEOUT_REQUEST_MS,
            connect_timeout_ms: network::TIMEOUT_CONNECTION_MS,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(api_key.into()));
        self
    }

    pub fn with_password(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = non_empty(Some(username.into()));
        self.password = non_empty(Some(password.into()));
        self
    }

    pub fn with_timeouts(mut self, timeout_ms: u64, connect_timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(lookup(env::BASE_URL)).ok_or_else(|| {
            ClientError::configuration(format!("{} is required", env::BASE_URL))
        })?;
        let mut config = Self::new(&base_url)?;
        config.api_key = non_empty(lookup(env::API_KEY));
        config.username = non_empty(lookup(env::USERNAME));
        config.password = non_empty(lookup(env::PASSWORD));
        if let Some(ms) = parse_ms(lookup(env::TIMEOUT_MS), env::TIMEOUT_MS)? {
            config.timeout_ms = ms;
        }
        if let Some(ms) = parse_ms(lookup(env::CONNECT_TIMEOUT_MS), env::CONNECT_TIMEOUT_MS)? {
            config.connect_timeout_ms = ms;
        }
        Ok(config)
    }

    /// API key wins when both sources are configured.
    pub fn credential_source(&self) -> CredentialSource<'_> {
        if let Some(key) = self.api_key.as_deref() {
            return CredentialSource::ApiKey(key);
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => CredentialSource::Password { username, password },
            _ => CredentialSource::Missing,
        }
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::GRAPHQL_PATH)
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::LOGIN_PATH)
    }

    pub fn ingest_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::INGEST_PATH)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask(&self.api_key))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_ms(raw: Option<String>, label: &str) -> Result<Option<u64>, ClientError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Some(ms)),
        _ => Err(ClientError::configuration(format!(
            "{} must be a positive integer (got '{}')",
            label, raw
        ))),
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ClientError::configuration("base URL is required"));
    }
    let mut url = Url::parse(raw)
        .map_err(|_| ClientError::configuration(format!("Invalid base URL: {}", raw)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::configuration(format!(
            "Base URL must use http or https: {}",
            raw
        )));
    }
    url.set_fragment(None);
    url.set_query(None);
    let normalized = format!("{}{}", url.origin().ascii_serialization(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn base_url_is_required() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn base_url_is_normalized() {
        let config = ClientConfig::from_lookup(lookup(&[(
            env::BASE_URL,
            "https://risk.example.com/tenant/?x=1#frag",
        )]))
        .expect("config");
        assert_eq!(config.base_url, "https://risk.example.com/tenant");
        assert_eq!(config.graphql_url(), "https://risk.example.com/tenant/graphql");
    }

    #[test]
    fn api_key_takes_precedence_over_password() {
        let config = ClientConfig::from_lookup(lookup(&[
            (env::BASE_URL, "https://risk.example.com"),
            (env::API_KEY, "key-1"),
            (env::USERNAME, "ops"),
            (env::PASSWORD, "secret"),
        ]))
        .expect("config");
        assert_eq!(config.credential_source(), CredentialSource::ApiKey("key-1"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = ClientConfig::from_lookup(lookup(&[
            (env::BASE_URL, "https://risk.example.com"),
            (env::API_KEY, "   "),
            (env::USERNAME, "ops"),
        ]))
        .expect("config");
        assert_eq!(config.credential_source(), CredentialSource::Missing);
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            (env::BASE_URL, "https://risk.example.com"),
            (env::TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(env::TIMEOUT_MS));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = ClientConfig::new("https://risk.example.com")
            .expect("config")
            .with_password("ops", "hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("ops"));
    }
}
