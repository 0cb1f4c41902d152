//! Error types for the MCP crate.

use crate::protocol::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST};
use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code reported to the caller.
    pub fn code(&self) -> i32 {
        match self {
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::ToolNotFound { .. } | McpError::InvalidArguments { .. } => INVALID_PARAMS,
            McpError::StartupFailed(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let not_found = McpError::ToolNotFound {
            name: "drop_everything".to_string(),
        };
        assert_eq!(not_found.code(), -32602);
        assert_eq!(McpError::InvalidRequest("x".to_string()).code(), -32600);
        assert_eq!(McpError::StartupFailed("x".to_string()).code(), -32603);
    }
}
