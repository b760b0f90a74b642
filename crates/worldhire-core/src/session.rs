//! Mock authentication session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldhireError};
use crate::user::User;

/// An issued session with an absolute expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Issues a session for `user` valid for `ttl` from `now`.
    ///
    /// Tokens are `prefix_userId_millis`; unique per user and millisecond,
    /// not cryptographically random. Fails with a `Config` error when the
    /// expiry falls outside the representable range.
    pub fn issue(user: User, prefix: &str, now: DateTime<Utc>, ttl: Duration) -> Result<Self> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| WorldhireError::config("session expiry is out of range"))?;
        let token = format!("{}_{}_{}", prefix, user.id, now.timestamp_millis());
        Ok(Self {
            user,
            token,
            expires_at,
        })
    }

    /// Valid strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry, or `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.is_valid_at(now).then(|| self.expires_at - now)
    }
}

/// Result envelope for displaying an auth attempt in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<User>> for AuthOutcome {
    fn from(result: Result<User>) -> Self {
        match result {
            Ok(user) => Self {
                success: true,
                user: Some(user),
                error: None,
            },
            Err(e) => Self {
                success: false,
                user: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl From<Result<()>> for AuthOutcome {
    fn from(result: Result<()>) -> Self {
        Self {
            success: result.is_ok(),
            user: None,
            error: result.err().map(|e| e.to_string()),
        }
    }
}
