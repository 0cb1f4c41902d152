//! MCP server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the MCP HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Listen host.
    #[serde(default = "default_http_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

impl McpConfig {
    /// Address the listener binds to, e.g. `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}
