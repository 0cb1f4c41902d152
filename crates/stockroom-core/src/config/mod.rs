//! Configuration types for the Stockroom MCP server.
//!
//! The binary assembles a [`StockroomConfig`] from command line arguments and
//! environment variables (a `.env` file is honoured). Library crates only ever
//! see these plain structs.
//!
//! # Sections
//!
//! - **mcp**: listen address of the HTTP transport
//! - **keys**: injected signing identity and the persisted key record location
//! - **token**: issuer/audience/subject of the administrative token and its lifetime
//! - **store**: document store connection string and collection name

pub mod keys;
pub mod mcp;
pub mod store;

use serde::{Deserialize, Serialize};

pub use keys::{KeyConfig, TokenConfig};
pub use mcp::McpConfig;
pub use store::StoreConfig;

/// Complete Stockroom configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StockroomConfig {
    /// MCP HTTP transport settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Signing identity settings.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Administrative token settings.
    #[serde(default)]
    pub token: TokenConfig,

    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,
}
