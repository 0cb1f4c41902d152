use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockroom_core::StockroomConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ConfigArgs;

#[derive(Parser, Debug)]
#[command(
    name = "stockroom",
    version,
    about = "Token-protected MCP server for a product collection"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server (default).
    Serve,

    /// Key management.
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Token management.
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair.
    Generate {
        /// Write a key record to this file instead of printing the PEMs
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a token with the server's identity.
    Mint {
        /// Write the token to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a token and print its claims.
    Verify {
        /// The token to verify
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = StockroomConfig::from(cli.config);

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(config).await?,
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },
        Command::Token { cmd } => match cmd {
            TokenCommand::Mint { output } => commands::token::mint(&config, output)?,
            TokenCommand::Verify { token } => commands::token::verify(&config, &token)?,
        },
    }

    Ok(())
}
