use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims of an admin session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    pub sub: String,
    /// Session id, the unit of revocation.
    pub sid: String,
    pub iat: i64,
    /// Issue time in milliseconds. `iat` alone cannot tell a session from a
    /// password change made in the same second.
    pub iat_ms: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn issued_before(&self, at: DateTime<Utc>) -> bool {
        self.iat_ms < at.timestamp_millis()
    }

    pub fn remaining_secs(&self, now: i64) -> u64 {
        u64::try_from(self.exp - now).unwrap_or(0)
    }
}

/// Claims of a signed file URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileClaims {
    pub path: String,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Header the token is sent back in.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        LoginResponse {
            token,
            token_type: crate::constants::ADMIN_TOKEN_HEADER.to_string(),
            expires_at,
        }
    }
}
