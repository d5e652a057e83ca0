use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::app::AppState;
use crate::auth::{verify_token, AuthError, Claims};
use crate::error::ApiError;

/// Verified admin session as reported by `/auth/whoami`
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub role: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Claims> for AdminSession {
    fn from(claims: Claims) -> Self {
        Self {
            expires_at: claims.expires_at(),
            role: claims.role,
        }
    }
}

/// Gate for the dashboard routes. A no-op unless
/// `security.require_admin_token` is enabled.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.security.require_admin_token {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let claims = verify_token(&state.config.security, token).map_err(|e| {
        tracing::warn!("Rejected admin token: {}", e);
        e
    })?;

    tracing::debug!("Admin token {} accepted for {}", claims.jti, request.uri().path());
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}
