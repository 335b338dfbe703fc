use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config;
use crate::store::models::User;

/// JWT payload asserted by the authentication layer. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(24)).timestamp();

        Self {
            sub,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Result of checking a presented refresh token against a stored identity.
#[derive(Debug, Clone, Copy)]
pub struct TokenCheck {
    /// Digest of the presented token equals the stored digest
    pub matches: bool,
    /// Stored token has not expired
    pub valid: bool,
}

/// Hex SHA-256 digest used for refresh tokens at rest.
pub fn hash_refresh_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Validate a presented refresh token against the stored identity record.
pub fn check_refresh_token(user: &User, presented: &str) -> TokenCheck {
    let matches = match user.refresh_token_hash.as_deref() {
        Some(stored) if !presented.is_empty() => stored == hash_refresh_token(presented),
        _ => false,
    };

    let valid = user
        .refresh_token_expires_at
        .map(|expires_at| expires_at > Utc::now())
        .unwrap_or(false);

    TokenCheck { matches, valid }
}
