// auth/mod.rs - Admin session tokens
//
// The dashboard password is compared on the server and exchanged for a
// signed JWT. Clients keep the token and present it as a Bearer header;
// only the server can mint or verify one.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn admin(expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: ADMIN_ROLE.to_string(),
            role: ADMIN_ROLE.to_string(),
            jti: Uuid::new_v4(),
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Admin login is not configured")]
    NotConfigured,

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}

/// Compare a candidate password against the configured one by SHA-256 digest
pub fn check_password(security: &SecurityConfig, candidate: &str) -> Result<(), AuthError> {
    if security.admin_password.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let expected = Sha256::digest(security.admin_password.as_bytes());
    let given = Sha256::digest(candidate.as_bytes());
    if expected == given {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}

pub fn issue_token(security: &SecurityConfig) -> Result<(String, Claims), AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let claims = Claims::admin(security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

    Ok((token, claims))
}

pub fn verify_token(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

    if claims.role != ADMIN_ROLE {
        return Err(AuthError::InvalidToken("not an admin token".to_string()));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn password_check() {
        let security = AppConfig::development().security;
        assert!(check_password(&security, "8922").is_ok());
        assert!(matches!(check_password(&security, "1234"), Err(AuthError::InvalidPassword)));
        assert!(matches!(check_password(&security, ""), Err(AuthError::InvalidPassword)));
    }

    #[test]
    fn unconfigured_password_rejects_everything() {
        let mut security = AppConfig::development().security;
        security.admin_password.clear();
        assert!(matches!(check_password(&security, ""), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn issued_token_verifies() {
        let security = AppConfig::development().security;
        let (token, claims) = issue_token(&security).unwrap();
        let verified = verify_token(&security, &token).unwrap();
        assert_eq!(verified.jti, claims.jti);
        assert_eq!(verified.role, ADMIN_ROLE);
        assert!(verified.expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.jwt_secret = "another-secret".to_string();

        let (token, _) = issue_token(&other).unwrap();
        assert!(matches!(verify_token(&security, &token), Err(AuthError::InvalidToken(_))));
        assert!(verify_token(&security, "not-a-jwt").is_err());
    }
}
