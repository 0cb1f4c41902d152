//! # stockroom-mcp
//!
//! MCP (Model Context Protocol) server exposing a product collection as tools.
//!
//! ## Architecture
//!
//! ```text
//! MCP client
//!       │
//!       │ POST /mcp  (Authorization: Bearer <jwt>)
//!       ▼
//! ┌──────────────────────┐
//! │  HTTP transport      │
//! │  1. Verify token     │  ← stockroom-auth
//! │  2. JSON-RPC dispatch│
//! │  3. Run tool         │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      DocumentStore       ← stockroom-store
//! ```
//!
//! The tools are listed in [`catalog`].

pub mod catalog;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

// Re-export main types
pub use error::McpError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use http_transport::{HttpServer, HttpTransportState, create_router};
pub use protocol::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, RequestContext, ToolContent,
    ToolDefinition,
};
pub use server::McpServer;
pub use tools::ToolRegistry;
