use thiserror::Error;

/// Failure classes produced by the authenticated request core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("GraphQL errors: {0}")]
    RemoteQuery(String),
    #[error("Empty result: {0}")]
    EmptyResult(String),
    #[error("Network error: {message}")]
    Network { message: String, timed_out: bool },
}

impl ClientError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote_query(message: impl Into<String>) -> Self {
        Self::RemoteQuery(message.into())
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ClientError::timeout("HTTP request timed out");
        }
        ClientError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_remote_message() {
        let err = ClientError::remote_query("Field 'x' not found; bad filter");
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field 'x' not found; bad filter"
        );
    }

    #[test]
    fn timeout_is_a_network_error() {
        let err = ClientError::timeout("slow");
        assert!(matches!(err, ClientError::Network { timed_out: true, .. }));
        assert_eq!(err.to_string(), "Network error: slow");
    }
}
