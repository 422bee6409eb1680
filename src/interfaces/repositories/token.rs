use chrono::{DateTime, Utc};

use crate::{
    entities::token::{FileClaims, SessionClaims},
    errors::AuthError,
};

/// Issues and checks the signed tokens the API hands out.
#[cfg_attr(test, mockall::automock)]
pub trait TokenServiceRepository: Send + Sync {
    /// Creates a fresh admin session token and returns it with its claims.
    fn create_session(&self, now: DateTime<Utc>) -> Result<(String, SessionClaims), AuthError>;

    /// Decodes a session token, rejecting bad signatures and expired tokens.
    fn decode_session(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// Signs a storage path for read access until the returned instant.
    fn sign_file(&self, path: &str, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AuthError>;

    fn decode_file(&self, token: &str) -> Result<FileClaims, AuthError>;
}
