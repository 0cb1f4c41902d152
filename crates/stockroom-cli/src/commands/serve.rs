//! Serve command for starting the MCP server.
//!
//! `stockroom serve` - Start the authenticated MCP HTTP server.

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use stockroom_auth::{KeyMaterial, TokenBuilder, TokenVerifier, obtain_key_pair};
use stockroom_core::StockroomConfig;
use stockroom_mcp::{HttpServer, McpServer};
use stockroom_store::open_store;

/// Identity and administrative token prepared before the listener binds.
pub struct Credentials {
    pub material: KeyMaterial,
    pub admin_token: String,
}

/// Obtain the keypair and mint the administrative token.
///
/// The token is written to the token file unless the identity was injected.
pub fn prepare_credentials(config: &StockroomConfig) -> anyhow::Result<Credentials> {
    let material = obtain_key_pair(&config.keys).context("Failed to obtain signing keypair")?;

    let admin_token = TokenBuilder::new(material.key_pair.clone())
        .mint(
            &config.token.subject,
            &config.token.issuer,
            &config.token.audience,
            config.token.lifetime_days,
        )
        .context("Failed to mint administrative token")?;

    if !material.source.is_injected() {
        write_token_file(&config.token.token_file, &admin_token)?;
        tracing::info!(
            path = %config.token.token_file.display(),
            subject = %config.token.subject,
            lifetime_days = config.token.lifetime_days,
            "Wrote administrative token"
        );
    }

    Ok(Credentials {
        material,
        admin_token,
    })
}

fn write_token_file(path: &Path, token: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open token file {}", path.display()))?;
    writeln!(file, "{}", token)
        .with_context(|| format!("Failed to write token file {}", path.display()))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the server until Ctrl-C.
pub async fn run(config: StockroomConfig) -> anyhow::Result<()> {
    let credentials = prepare_credentials(&config)?;
    let source = credentials.material.source;

    if !source.is_injected() {
        println!("✔ Administrative token ({}):", config.token.token_file.display());
        println!("{}", credentials.admin_token);
        println!();
    }

    let verifier = TokenVerifier::new(
        credentials.material.key_pair.public_key().clone(),
        &config.token.issuer,
        &config.token.audience,
    );

    let store = open_store(&config.store)
        .await
        .context("Failed to open document store")?;

    tracing::info!(
        key_source = %source,
        collection = %config.store.collection,
        addr = %config.mcp.bind_addr(),
        "Starting Stockroom MCP server"
    );

    let server = McpServer::new(store.clone());
    let result = HttpServer::new(config.mcp.clone(), server, verifier)
        .run(shutdown_signal())
        .await;

    store.close().await;
    result.context("MCP server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_auth::{KeyPair, KeySource};
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> StockroomConfig {
        let mut config = StockroomConfig::default();
        config.keys.keypair_file = dir.join("mcp_keypair.json");
        config.token.token_file = dir.join("client_token.txt");
        config
    }

    #[test]
    fn test_first_run_generates_and_writes_token() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let credentials = prepare_credentials(&config).unwrap();
        assert_eq!(credentials.material.source, KeySource::Generated);
        assert!(config.keys.keypair_file.exists());

        let written = fs::read_to_string(&config.token.token_file).unwrap();
        assert_eq!(written.trim(), credentials.admin_token);
    }

    #[test]
    fn test_second_run_reuses_identity() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let first = prepare_credentials(&config).unwrap();
        let second = prepare_credentials(&config).unwrap();
        assert_eq!(second.material.source, KeySource::LoadedFromFile);
        assert_eq!(
            first.material.key_pair.public_key(),
            second.material.key_pair.public_key()
        );

        // A token from the first run still verifies after restart.
        let verifier = TokenVerifier::new(
            second.material.key_pair.public_key().clone(),
            &config.token.issuer,
            &config.token.audience,
        );
        assert!(verifier.verify(&first.admin_token).is_ok());
    }

    #[test]
    fn test_injected_identity_writes_nothing() {
        let dir = tempdir().unwrap();
        let keypair = KeyPair::generate().unwrap();
        let mut config = config_in(dir.path());
        config.keys.private_key = Some(keypair.private_key_pem().to_string());
        config.keys.public_key = Some(keypair.public_key_pem().to_string());

        let credentials = prepare_credentials(&config).unwrap();
        assert_eq!(credentials.material.source, KeySource::Injected);
        assert!(!config.keys.keypair_file.exists());
        assert!(!config.token.token_file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        prepare_credentials(&config).unwrap();

        let mode = fs::metadata(&config.token.token_file)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
