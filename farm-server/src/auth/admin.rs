//! Admin session tokens (JWT) and password check
//!
//! One shared admin password, checked against configuration. Session
//! tokens are HS256 JWTs carrying a random `jti`, valid strictly under
//! 24 hours (zero validation leeway), and cannot be minted without the
//! server secret.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::security_log;
use crate::state::AppState;

const TOKEN_TTL_HOURS: i64 = 24;

/// Fixed delay applied to every login attempt, success or failure
pub const LOGIN_DELAY_MS: u64 = 500;

/// JWT claims for the admin session
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Always "admin" (single-operator shop)
    pub sub: String,
    /// Random nonce, makes every token unique
    pub jti: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated admin identity extracted from a valid token
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    /// Token expiry in epoch milliseconds
    pub expires_at: i64,
}

/// Check a login attempt against the configured admin password.
///
/// Fails closed: an unset or empty configured password rejects every
/// candidate, including an empty one.
pub fn check_password(candidate: &str, configured: Option<&str>) -> bool {
    match configured {
        Some(password) if !password.is_empty() => password == candidate,
        _ => false,
    }
}

/// Create an admin session token. Returns the token and its expiry in
/// epoch milliseconds.
pub fn create_token(secret: &str) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let expires = now + chrono::Duration::hours(TOKEN_TTL_HOURS);
    let claims = AdminClaims {
        sub: "admin".to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, expires.timestamp_millis()))
}

/// Decode and validate an admin session token
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    // Expiry is exact: a token is valid strictly under 24 hours
    validation.leeway = 0;
    let data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Middleware that extracts and verifies the admin JWT from the
/// Authorization header, inserting an [`AdminIdentity`] into extensions.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", request.uri()));
            AppError::unauthorized().into_response()
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format").into_response())?;

    let claims = decode_token(token, &state.jwt_secret).map_err(|e| {
        security_log!("WARN", "auth_rejected", reason = e.to_string());
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired().into_response(),
            _ => AppError::invalid_token("Invalid or expired token").into_response(),
        }
    })?;

    let identity = AdminIdentity {
        expires_at: (claims.exp as i64) * 1000,
    };
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
