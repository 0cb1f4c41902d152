//! Signing identity and token configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the service's signing identity.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Injected private key (PKCS#8 PEM). Must be paired with `public_key`.
    #[serde(default)]
    pub private_key: Option<String>,

    /// Injected public key (SPKI PEM). Must be paired with `private_key`.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Location of the persisted key record used when nothing is injected.
    #[serde(default = "default_keypair_file")]
    pub keypair_file: PathBuf,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            public_key: None,
            keypair_file: default_keypair_file(),
        }
    }
}

impl KeyConfig {
    /// Injected private key, treating blank values as absent.
    pub fn injected_private_key(&self) -> Option<&str> {
        non_blank(self.private_key.as_deref())
    }

    /// Injected public key, treating blank values as absent.
    pub fn injected_public_key(&self) -> Option<&str> {
        non_blank(self.public_key.as_deref())
    }
}

// Key material must never end up in logs.
impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key.as_ref().map(|_| "<set>"))
            .field("keypair_file", &self.keypair_file)
            .finish()
    }
}

/// Configuration for the administrative token minted at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// `iss` claim; also the issuer every inbound token must carry.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// `aud` claim; also the audience every inbound token must carry.
    #[serde(default = "default_audience")]
    pub audience: String,

    /// `sub` claim of the administrative token.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Token lifetime in days.
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: u32,

    /// File the administrative token is written to outside managed environments.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            audience: default_audience(),
            subject: default_subject(),
            lifetime_days: default_lifetime_days(),
            token_file: default_token_file(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_keypair_file() -> PathBuf {
    PathBuf::from("mcp_keypair.json")
}

fn default_token_file() -> PathBuf {
    PathBuf::from("client_token.txt")
}

fn default_issuer() -> String {
    "stockroom-mcp-server".to_string()
}

fn default_audience() -> String {
    "stockroom-mcp".to_string()
}

fn default_subject() -> String {
    "stockroom-client".to_string()
}

fn default_lifetime_days() -> u32 {
    365
}
