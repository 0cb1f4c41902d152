//! Error types for the auth crate.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while managing keys or handling tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Injected key material is partial or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The persisted key record is unreadable, corrupt or cannot be written.
    #[error("key storage error at {}: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    /// Failed to encode key material.
    #[error("failed to encode key: {0}")]
    KeyEncoding(String),

    /// Claims violate their invariants (empty fields, non-positive lifetime).
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// The signer rejected the key or the claims.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// An inbound token was rejected.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationFailure),
}

impl AuthError {
    pub(crate) fn storage(path: &Path, reason: impl Into<String>) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// The rejection reason, if this is an authentication error.
    pub fn authentication_failure(&self) -> Option<AuthenticationFailure> {
        match self {
            Self::Authentication(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthenticationFailure {
    /// Not a well-formed JWT or the claims do not deserialize.
    #[error("malformed token")]
    Malformed,

    /// Signature does not verify against the service's public key.
    #[error("invalid signature")]
    InvalidSignature,

    /// `exp` is not in the future.
    #[error("token has expired")]
    Expired,

    /// `iss` differs from the configured issuer.
    #[error("issuer mismatch")]
    IssuerMismatch,

    /// `aud` differs from the configured audience.
    #[error("audience mismatch")]
    AudienceMismatch,

    /// Header names an algorithm other than EdDSA.
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,

    /// A required claim is absent.
    #[error("missing required claim")]
    MissingClaim,
}

impl From<jsonwebtoken::errors::Error> for AuthenticationFailure {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnsupportedAlgorithm
            }
            ErrorKind::MissingRequiredClaim(_) => Self::MissingClaim,
            _ => Self::Malformed,
        }
    }
}
