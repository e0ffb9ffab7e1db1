pub mod network {
    pub const TIMEOUT_REQUEST_MS: u64 = 30_000;
    pub const TIMEOUT_CONNECTION_MS: u64 = 5_000;
    pub const USER_AGENT: &str = "riskgraph/0.3";
}

pub mod endpoints {
    pub const GRAPHQL_PATH: &str = "/graphql";
    pub const LOGIN_PATH: &str = "/api/auth/login";
    pub const INGEST_PATH: &str = "/api/ingest";
    pub const API_KEY_HEADER: &str = "X-API-Key";
}

pub mod auth {
    /// Lead time subtracted from a login token's lifetime.
    pub const SAFETY_MARGIN_SECS: i64 = 5 * 60;
    /// API keys never rotate in-process; this only keeps the session shape uniform.
    pub const API_KEY_HORIZON_SECS: i64 = 24 * 60 * 60;
}

pub mod limits {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1_000;
    pub const CLUSTER_DEFAULT_LIMIT: i64 = 50;
    pub const CLUSTER_MAX_LIMIT: i64 = 500;
    pub const ERROR_BODY_PREVIEW_BYTES: usize = 2_048;
}

pub mod env {
    pub const BASE_URL: &str = "RISKGRAPH_BASE_URL";
    pub const API_KEY: &str = "RISKGRAPH_API_KEY";
    pub const USERNAME: &str = "RISKGRAPH_USERNAME";
    pub const PASSWORD: &str = "RISKGRAPH_PASSWORD";
    pub const TIMEOUT_MS: &str = "RISKGRAPH_TIMEOUT_MS";
    pub const CONNECT_TIMEOUT_MS: &str = "RISKGRAPH_CONNECT_TIMEOUT_MS";
}
