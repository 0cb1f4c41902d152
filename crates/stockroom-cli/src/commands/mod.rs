//! CLI command implementations for the Stockroom MCP server.

pub mod keys;
pub mod serve;
pub mod token;

use clap::Args;
use std::path::PathBuf;
use stockroom_core::{KeyConfig, McpConfig, StockroomConfig, StoreConfig, TokenConfig};

/// Process configuration shared by every subcommand.
///
/// Each option falls back to an environment variable; a `.env` file in the
/// working directory is loaded before parsing.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Document store connection string (memory:// or postgres://...)
    #[arg(long, env = "DATABASE_URI", default_value = "memory://", global = true)]
    pub database_uri: String,

    /// Collection the tools operate on
    #[arg(long, env = "COLLECTION", default_value = "ecommerce", global = true)]
    pub collection: String,

    /// Listen host
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 8000, global = true)]
    pub port: u16,

    /// Injected signing key (PKCS#8 PEM)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    /// Injected verification key (SPKI PEM)
    #[arg(long, env = "PUBLIC_KEY", hide_env_values = true, global = true)]
    pub public_key: Option<String>,

    /// Persisted key record, used when no keys are injected
    #[arg(long, env = "KEYPAIR_FILE", default_value = "mcp_keypair.json", global = true)]
    pub keypair_file: PathBuf,

    /// Where `serve` writes the administrative token
    #[arg(long, env = "TOKEN_FILE", default_value = "client_token.txt", global = true)]
    pub token_file: PathBuf,

    /// Token issuer
    #[arg(long, env = "TOKEN_ISSUER", default_value = "stockroom-mcp-server", global = true)]
    pub issuer: String,

    /// Token audience
    #[arg(long, env = "TOKEN_AUDIENCE", default_value = "stockroom-mcp", global = true)]
    pub audience: String,

    /// Token subject
    #[arg(long, env = "TOKEN_SUBJECT", default_value = "stockroom-client", global = true)]
    pub subject: String,

    /// Token lifetime in days
    #[arg(long, env = "TOKEN_LIFETIME_DAYS", default_value_t = 365, global = true)]
    pub lifetime_days: u32,
}

impl From<ConfigArgs> for StockroomConfig {
    fn from(args: ConfigArgs) -> Self {
        StockroomConfig {
            mcp: McpConfig {
                host: args.host,
                port: args.port,
            },
            keys: KeyConfig {
                private_key: args.private_key,
                public_key: args.public_key,
                keypair_file: args.keypair_file,
            },
            token: TokenConfig {
                issuer: args.issuer,
                audience: args.audience,
                subject: args.subject,
                lifetime_days: args.lifetime_days,
                token_file: args.token_file,
            },
            store: StoreConfig {
                database_uri: args.database_uri,
                collection: args.collection,
            },
        }
    }
}
