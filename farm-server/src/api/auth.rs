//! Admin authentication endpoints: login, session check

use axum::{Extension, Json, extract::State};
use shared::client::{CheckAuthResponse, LoginRequest, LoginResponse};
use shared::error::{AppError, ErrorCode};

use super::ApiResult;
use crate::auth::AdminIdentity;
use crate::auth::admin::{self, LOGIN_DELAY_MS};
use crate::security_log;
use crate::state::AppState;

/// POST /api/admin/login
///
/// Runs in constant wall-clock time regardless of outcome, and returns
/// the same generic rejection for a wrong password and for an
/// unconfigured one.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    tokio::time::sleep(std::time::Duration::from_millis(LOGIN_DELAY_MS)).await;

    if !admin::check_password(&req.password, state.admin_password.as_deref()) {
        security_log!("WARN", "admin_login_failed", configured = state.admin_password.is_some());
        return Err(AppError::invalid_credentials());
    }

    let (token, expires_at) = admin::create_token(&state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    security_log!("INFO", "admin_login_ok", expires_at = expires_at);

    Ok(Json(LoginResponse { token, expires_at }))
}

/// GET /api/admin/session
///
/// Reached only through the auth middleware, so arriving here means the
/// token is valid.
pub async fn check_session(
    Extension(identity): Extension<AdminIdentity>,
) -> ApiResult<CheckAuthResponse> {
    Ok(Json(CheckAuthResponse {
        authenticated: true,
        expires_at: identity.expires_at,
    }))
}
