use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use uuid::Uuid;

use crate::entities::token::{FileClaims, SessionClaims};
use crate::errors::AuthError;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, SigningKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;
const ADMIN_SUBJECT: &str = "admin";

#[derive(Clone)]
pub struct JwtService {
    keys: SigningKeys,
    session_expiration: Duration,
    file_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: SigningKeys::from(config),
            session_expiration: Duration::minutes(config.session_ttl_minutes),
            file_expiration: Duration::minutes(config.signed_url_ttl_minutes),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenServiceRepository for JwtService {
    fn create_session(&self, now: DateTime<Utc>) -> Result<(String, SessionClaims), AuthError> {
        let claims = SessionClaims {
            sub: ADMIN_SUBJECT.to_string(),
            sid: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: (now + self.session_expiration).timestamp(),
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.session_encoding)
            .map_err(|_| AuthError::TokenCreation)?;
        Ok((token, claims))
    }

    fn decode_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.keys.session_decoding, &Self::validation())?;
        if data.claims.sub != ADMIN_SUBJECT {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }

    fn sign_file(&self, path: &str, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = now + self.file_expiration;
        let claims = FileClaims {
            path: path.to_string(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.file_encoding)
            .map_err(|_| AuthError::TokenCreation)?;
        Ok((token, expires_at))
    }

    fn decode_file(&self, token: &str) -> Result<FileClaims, AuthError> {
        decode::<FileClaims>(token, &self.keys.file_decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
