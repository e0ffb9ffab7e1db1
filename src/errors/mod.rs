mod client_error;
mod mcp_error;
mod tool_error;

pub use client_error::ClientError;
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
