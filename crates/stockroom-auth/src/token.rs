//! Token creation and verification.

use crate::claims::TokenClaims;
use crate::error::{AuthError, AuthenticationFailure};
use crate::keys::{KeyPair, PublicKey};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};

/// Builder for signing bearer tokens.
pub struct TokenBuilder {
    keypair: KeyPair,
}

impl TokenBuilder {
    /// Create a new token builder with the given keypair.
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Mint a token for `subject`, valid for `lifetime_days` from now.
    pub fn mint(
        &self,
        subject: &str,
        issuer: &str,
        audience: &str,
        lifetime_days: u32,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims::for_days(subject, issuer, audience, lifetime_days);
        self.sign(&claims)
    }

    /// Sign pre-built claims.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        claims.validate()?;

        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());

        let encoding_key = self.keypair.encoding_key()?;
        jsonwebtoken::encode(&header, claims, &encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

/// Verifier for bearer tokens.
///
/// Holds only the public half of the identity plus the issuer and audience
/// every token must carry.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    /// Create a new token verifier.
    pub fn new(public_key: PublicKey, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            decoding_key: public_key.decoding_key(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Verify a token and extract its claims.
    ///
    /// Checks the signature, then issuer, audience and `now < exp`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["sub", "iss", "aud", "iat", "exp"]);

        let data = jsonwebtoken::decode::<TokenClaims>(token.trim(), &self.decoding_key, &validation)
            .map_err(AuthenticationFailure::from)?;
        let claims = data.claims;

        // jsonwebtoken accepts exp == now; tokens are valid strictly before exp.
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthenticationFailure::Expired.into());
        }

        Ok(claims)
    }
}
