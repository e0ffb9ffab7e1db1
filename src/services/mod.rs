pub mod config;
pub mod executor;
pub mod logger;
pub mod session;
pub mod tool_executor;
pub mod validation;
