use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub uid: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { uid: claims.sub }
    }
}

/// Authentication-context middleware.
///
/// Validates the Bearer JWT when one is present and injects AuthUser into
/// request extensions. It never rejects: the handler owns the 401 for an
/// absent identity, so a missing or invalid token just means no extension.
pub async fn auth_context_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_jwt_from_headers(&headers).and_then(|token| validate_jwt(&token)) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser::from(claims));
        }
        Err(msg) => {
            tracing::debug!("request carries no usable identity: {}", msg);
        }
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
