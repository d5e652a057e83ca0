use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handlers::auth::LoginResponse;

/// Admin token kept by the CLI between invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Not logged in. Run `registry auth login` first")]
    NotLoggedIn,

    #[error("Admin session expired. Run `registry auth login` again")]
    Expired,
}

impl StoredSession {
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: response.token,
            expires_at: response.expires_at,
            logged_in_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Gate for the dashboard commands: hand back the token of a live session
pub fn require_session(session: Option<&StoredSession>, now: DateTime<Utc>) -> Result<&str, SessionError> {
    let session = session.ok_or(SessionError::NotLoggedIn)?;
    if session.is_expired(now) {
        return Err(SessionError::Expired);
    }
    Ok(&session.token)
}
