use anyhow::Context;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::config::token_ttl_minutes;
use crate::models::models::Claims;

/// Why a presented token was rejected. Anything that is not a verified
/// signature over well-formed claims is `InvalidSignature`; a verified
/// token past its expiry is `Expired`.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    InvalidSignature,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Mint a signed bearer token for `subject_id`, expiring TTL minutes after
/// `now`.
pub fn issue(subject_id: &str, now: DateTime<Utc>, secret: &str) -> anyhow::Result<String> {
    let iat = now.timestamp();
    let claims = Claims {
        sub: subject_id.to_string(),
        iat,
        exp: iat + token_ttl_minutes() * 60,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to issue token")
}

/// Verify a bearer token and return its subject id.
///
/// Expiry is checked against the caller's `now`, not the system clock, so
/// the cutoff is exact: a token is rejected from the instant `now >= exp`.
pub fn decode(token: &str, now: DateTime<Utc>, secret: &str) -> Result<String, TokenError> {
    let mut validation = Validation::default();
    // Expiry is enforced below against `now`; jsonwebtoken would use the
    // system clock with leeway.
    validation.validate_exp = false;

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| TokenError::InvalidSignature)?;

    if now.timestamp() >= data.claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(data.claims.sub)
}
