// Configuration types shared across all Stockroom crates
pub mod config;

// Schema-flexible document model used by the store and the MCP tools
pub mod document;

pub use config::{KeyConfig, McpConfig, StockroomConfig, StoreConfig, TokenConfig};
pub use document::{Document, DocumentError, ID_FIELD};
