//! JWT access-token validation.
//!
//! Tokens are minted by the external session/identity provider and signed
//! with a shared HS256 secret. The engine validates and trusts the claims;
//! it performs no independent identity verification and issues no tokens.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the identity provider embeds in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the caller's tax-id-equivalent identifier.
    pub sub: String,
    /// Display name used for message and inspection authorship.
    pub name: String,
    /// Role name (`resident`, `administrator`, `engineering`, `developer`).
    pub role: String,
    /// Master/non-resident account flag; grants `ReviewRequests`.
    #[serde(default)]
    pub master: bool,
    /// Unit: apartment number, present for residents.
    pub apartment: Option<String>,
    /// Unit: tower identifier, present for residents.
    pub tower: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl JwtConfig {
    /// Load JWT configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");
        Self { secret }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature, expiration, and issued-at claims automatically.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
