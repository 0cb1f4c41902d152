//! Registered JWT claims carried by Stockroom bearer tokens.

use crate::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds in one day of token lifetime.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Claims of a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (the caller).
    pub sub: String,
    /// Issuer (this service).
    pub iss: String,
    /// Audience (the intended consumer).
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration time (unix seconds).
    pub exp: i64,
}

impl TokenClaims {
    /// Claims issued now and valid for `validity`.
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        validity: Duration,
    ) -> Self {
        Self::issued_at_time(subject, issuer, audience, Utc::now(), validity)
    }

    /// Claims issued at an explicit instant.
    pub fn issued_at_time(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            iss: issuer.into(),
            aud: audience.into(),
            iat,
            exp: iat + validity.num_seconds(),
        }
    }

    /// Claims issued now and valid for `lifetime_days` whole days.
    pub fn for_days(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        lifetime_days: u32,
    ) -> Self {
        let mut claims = Self::new(subject, issuer, audience, Duration::zero());
        claims.exp = claims.iat + i64::from(lifetime_days) * SECONDS_PER_DAY;
        claims
    }

    /// Check the invariants: non-empty identities and `exp > iat`.
    pub fn validate(&self) -> Result<(), AuthError> {
        for (name, value) in [("sub", &self.sub), ("iss", &self.iss), ("aud", &self.aud)] {
            if value.trim().is_empty() {
                return Err(AuthError::InvalidClaims(format!("'{}' must not be empty", name)));
            }
        }
        if self.exp <= self.iat {
            return Err(AuthError::InvalidClaims(
                "expiry must be after the issue time".to_string(),
            ));
        }
        Ok(())
    }

    /// When the token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    /// When the token expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}
