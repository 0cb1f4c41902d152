//! # stockroom-auth
//!
//! Signing identity and bearer token handling for the Stockroom MCP server.
//!
//! This crate provides functionality for:
//! - Loading, generating and persisting the Ed25519 service keypair
//! - Minting long-lived JWTs bound to issuer, audience and subject
//! - Verifying inbound JWTs before any tool call runs
//!
//! ## Credential flow
//!
//! | Step | Who | What |
//! |------|-----|------|
//! | **Obtain keypair** | startup | injected secrets, else the persisted record, else generate and persist |
//! | **Mint** | startup | one administrative token, handed out of band |
//! | **Verify** | every request | signature, `iss`, `aud`, `exp` |
//!
//! The verifier only ever sees the public half of the keypair.

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use claims::TokenClaims;
pub use error::{AuthError, AuthenticationFailure};
pub use keys::{KeyMaterial, KeyPair, KeySource, PersistedKeyRecord, PublicKey, obtain_key_pair};
pub use token::{TokenBuilder, TokenVerifier};
