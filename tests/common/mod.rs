#![allow(dead_code)]

use once_cell::sync::Lazy;
use riskgraph::app::App;
use riskgraph::services::config::ClientConfig;
use riskgraph::services::logger::{LogLevel, Logger};
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn quiet_logger() -> Logger {
    Logger::new("test").with_level(LogLevel::Error)
}

pub fn api_key_app(base_url: &str) -> App {
    let config = ClientConfig::new(base_url)
        .expect("config")
        .with_api_key("test-key");
    App::with_config(config, quiet_logger()).expect("app")
}

pub fn password_app(base_url: &str) -> App {
    let config = ClientConfig::new(base_url)
        .expect("config")
        .with_password("analyst", "s3cret");
    App::with_config(config, quiet_logger()).expect("app")
}

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
