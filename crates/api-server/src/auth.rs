//! Session-token authentication.
//!
//! `register`/`login` issue a random bearer token; only its SHA-256 hash is
//! stored, so the sessions table never holds a usable credential and lookups
//! compare fixed-length hashes. Passwords are hashed with bcrypt.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::{AppError, AppState};

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/api/v1/status",
    "/api/v1/auth/register",
    "/api/v1/auth/login",
];

/// Authenticated user injected into request extensions by the middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Generate a 32-byte random session token, base64-encoded.
pub fn generate_token() -> String {
    let token_bytes: [u8; 32] = rand::thread_rng().gen();
    general_purpose::STANDARD.encode(token_bytes)
}

/// Hash a token with SHA-256 for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Session middleware.
///
/// Looks for the token in:
/// 1. X-Api-Token header
/// 2. Authorization: Bearer <token> header
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();
    if PUBLIC_PATHS.contains(&path) {
        return Ok(next.run(request).await);
    }

    let token = extract_token(&headers).ok_or_else(|| {
        AppError::Unauthorized(
            "Missing session token. Provide via X-Api-Token or Authorization: Bearer header."
                .to_string(),
        )
    })?;

    let user = state
        .db
        .session_user(&hash_token(&token))
        .await?
        .ok_or_else(|| {
            tracing::warn!("invalid session token attempted: {}", mask_token(&token));
            AppError::Unauthorized("Invalid or expired session token.".to_string())
        })?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Extract the session token from request headers.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("X-Api-Token") {
        if let Ok(token) = value.to_str() {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    if let Some(auth) = headers.get("Authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Mask a token for logging (first 4 and last 4 characters).
pub(crate) fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &token[..4], &token[token.len() - 4..])
}
