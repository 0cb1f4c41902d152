//! Key management commands.
//!
//! `stockroom keys generate` - Generate a new Ed25519 keypair.

use anyhow::Context;
use std::path::PathBuf;
use stockroom_auth::KeyPair;

/// Generate a new keypair.
///
/// With `output`, the pair is written as a persisted key record (never
/// overwriting an existing file); otherwise both PEMs are printed.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    if let Some(path) = output {
        keypair
            .save_to_file(&path)
            .with_context(|| format!("Failed to write key record to {}", path.display()))?;

        println!("✔ Generated Ed25519 keypair:");
        println!("  Key record:  {}", path.display());
        println!("  Fingerprint: {}", keypair.public_key().fingerprint());
        println!();
        println!("⚠️  Keep this file secure! Never commit it to version control.");
        println!();
        println!("Point the server at it with:");
        println!("  export KEYPAIR_FILE={}", path.display());
    } else {
        println!("Private key (keep secure!):");
        print!("{}", keypair.private_key_pem());
        println!();
        println!("Public key:");
        print!("{}", keypair.public_key_pem());
        println!();
        println!("Set PRIVATE_KEY and PUBLIC_KEY to inject them, or use --output <file>.");
    }

    Ok(())
}
