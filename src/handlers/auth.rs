// handlers/auth.rs - Admin session endpoints
//
// POST /auth/login   exchange the admin password for a signed token
// GET  /auth/whoami  verify a presented token

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{check_password, issue_token, verify_token};
use crate::error::ApiError;
use crate::middleware::{bearer_token, AdminSession, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiResponse {
    pub role: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let security = &state.config.security;
    if let Err(e) = check_password(security, &request.password) {
        tracing::warn!("Admin login failed: {}", e);
        return Err(e.into());
    }

    let (token, claims) = issue_token(security)?;
    tracing::info!("Admin session issued (jti {})", claims.jti);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_at: claims.expires_at(),
    }))
}

/// GET /auth/whoami
pub async fn whoami(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<WhoamiResponse> {
    let token = bearer_token(&headers)?;
    let session = AdminSession::from(verify_token(&state.config.security, token)?);

    Ok(ApiResponse::success(WhoamiResponse {
        role: session.role,
        expires_at: session.expires_at,
    }))
}
