//! Token management commands.
//!
//! `stockroom token mint` - Mint a token with the server's identity.
//! `stockroom token verify` - Verify a token is valid.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use stockroom_auth::{KeyPair, PublicKey, TokenBuilder, TokenClaims, TokenVerifier, obtain_key_pair};
use stockroom_core::StockroomConfig;

/// Mint a token using the same identity `serve` would use.
pub fn mint_token(config: &StockroomConfig) -> anyhow::Result<String> {
    let material = obtain_key_pair(&config.keys).context("Failed to obtain signing keypair")?;
    let token = TokenBuilder::new(material.key_pair)
        .mint(
            &config.token.subject,
            &config.token.issuer,
            &config.token.audience,
            config.token.lifetime_days,
        )
        .context("Failed to mint token")?;
    Ok(token)
}

/// Mint a token and print it (or write it to `output`).
pub fn mint(config: &StockroomConfig, output: Option<PathBuf>) -> anyhow::Result<()> {
    let token = mint_token(config)?;

    if let Some(path) = output {
        fs::write(&path, format!("{}\n", token))
            .with_context(|| format!("Failed to write token to {}", path.display()))?;
        println!("✔ Token written to: {}", path.display());
        println!("  Subject:  {}", config.token.subject);
        println!("  Lifetime: {} day(s)", config.token.lifetime_days);
    } else {
        println!("{}", token);
    }
    Ok(())
}

/// Public key tokens are verified against: injected, else the key record.
fn resolve_public_key(config: &StockroomConfig) -> anyhow::Result<PublicKey> {
    if let Some(pem) = config.keys.injected_public_key() {
        return PublicKey::from_pem(pem).context("Failed to parse PUBLIC_KEY");
    }

    let path = &config.keys.keypair_file;
    let keypair = KeyPair::load_from_file(path).with_context(|| {
        format!(
            "No PUBLIC_KEY set and the key record {} could not be loaded",
            path.display()
        )
    })?;
    Ok(keypair.public_key().clone())
}

/// Verify a token against the configured identity and return its claims.
pub fn verify_token(config: &StockroomConfig, token: &str) -> anyhow::Result<TokenClaims> {
    let verifier = TokenVerifier::new(
        resolve_public_key(config)?,
        &config.token.issuer,
        &config.token.audience,
    );
    let claims = verifier.verify(token).context("Token verification failed")?;
    Ok(claims)
}

/// Verify a token and print its claims.
pub fn verify(config: &StockroomConfig, token: &str) -> anyhow::Result<()> {
    let claims = verify_token(config, token)?;

    println!("✔ Token is valid");
    println!("  Subject:  {}", claims.sub);
    println!("  Issuer:   {}", claims.iss);
    println!("  Audience: {}", claims.aud);
    println!("  Issued:   {}", claims.issued_at());
    println!("  Expires:  {}", claims.expires_at());
    Ok(())
}
