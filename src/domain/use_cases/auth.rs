use chrono::{DateTime, Utc};
use validator::Validate;
use zeroize::Zeroizing;

use crate::auth::{
    password::{hash_password, verify_password},
    reset_tokens::ResetTokenStore,
    revocation::RevocationStore,
};
use crate::entities::admin::{
    ChangePasswordRequest, ConfirmPasswordReset, LoginRequest, PasswordResetRequest, ResetTokenRequest,
    ResetTokenResponse, ResetTokenStatus,
};
use crate::entities::token::{LoginResponse, SessionClaims};
use crate::errors::{AppError, AuthError};
use crate::limiter::login_limiter::LoginLimiter;
use crate::repositories::{admin::AdminRepository, token::TokenServiceRepository};

pub struct AuthHandler<R, T>
where
    R: AdminRepository,
    T: TokenServiceRepository,
{
    pub admin_repo: R,
    pub token_service: T,
    pub revocations: RevocationStore,
    pub reset_tokens: ResetTokenStore,
    pub limiter: LoginLimiter,
    recovery_key: Zeroizing<String>,
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0).ok_or(AuthError::TokenCreation)
}

fn keys_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

impl<R, T> AuthHandler<R, T>
where
    R: AdminRepository,
    T: TokenServiceRepository,
{
    pub fn new(
        admin_repo: R,
        token_service: T,
        revocations: RevocationStore,
        reset_tokens: ResetTokenStore,
        limiter: LoginLimiter,
        recovery_key: &str,
    ) -> Self {
        AuthHandler {
            admin_repo,
            token_service,
            revocations,
            reset_tokens,
            limiter,
            recovery_key: Zeroizing::new(recovery_key.to_string()),
        }
    }

    /// Creates the admin account on first start. Returns whether it was created.
    pub async fn ensure_account(&self, initial_password: Option<&str>) -> Result<bool, AppError> {
        if self.admin_repo.get_account().await?.is_some() {
            return Ok(false);
        }

        let Some(password) = initial_password.filter(|p| !p.is_empty()) else {
            tracing::warn!("No admin account exists and no initial admin password is configured");
            return Ok(false);
        };

        let created = self.admin_repo.create_account(&hash_password(password)?).await?;
        if created {
            tracing::info!("Admin account created from configuration");
        }
        Ok(created)
    }

    /// Verifies the admin password and opens a session.
    pub async fn login(&self, request: LoginRequest, client_ip: &str) -> Result<LoginResponse, AuthError> {
        self.limiter.check(client_ip).map_err(AuthError::RateLimited)?;
        request.validate().map_err(|_| AuthError::MissingCredentials)?;

        let account = self
            .admin_repo
            .get_account()
            .await?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &account.password_hash)
            .map_err(|e| {
                tracing::warn!("Password verification failed: {}", e);
                AuthError::WrongCredentials
            })?;
        if !is_password_valid {
            tracing::warn!(client_ip, "admin login rejected");
            return Err(AuthError::WrongCredentials);
        }

        self.limiter.reset(client_ip);
        let response = self.open_session()?;
        tracing::info!(client_ip, "admin logged in");
        Ok(response)
    }

    fn open_session(&self) -> Result<LoginResponse, AuthError> {
        let (token, claims) = self.token_service.create_session(Utc::now()).map_err(|e| {
            tracing::warn!("Failed to create session token: {}", e);
            AuthError::TokenCreation
        })?;
        Ok(LoginResponse::new(token, timestamp(claims.exp)?))
    }

    /// Checks an admin token. Every way a token can be unusable is reported
    /// as an expired session.
    pub async fn authenticate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self
            .token_service
            .decode_session(token)
            .map_err(|_| AuthError::SessionExpired)?;

        if self.revocations.is_revoked(&claims.sid).await? {
            return Err(AuthError::SessionExpired);
        }

        let account = self
            .admin_repo
            .get_account()
            .await?
            .ok_or(AuthError::SessionExpired)?;
        if claims.issued_before(account.password_changed_at) {
            return Err(AuthError::SessionExpired);
        }

        Ok(claims)
    }

    pub async fn logout(&self, claims: &SessionClaims) -> Result<(), AuthError> {
        let remaining = claims.remaining_secs(Utc::now().timestamp());
        self.revocations.revoke(&claims.sid, remaining).await?;
        tracing::info!("admin logged out");
        Ok(())
    }

    /// Changes the password and hands back a fresh session; older sessions
    /// stop working.
    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<LoginResponse, AuthError> {
        request.validate()?;

        let account = self
            .admin_repo
            .get_account()
            .await?
            .ok_or_else(|| AuthError::Account("Admin account not initialised".into()))?;
        if !verify_password(&request.current_password, &account.password_hash)? {
            return Err(AuthError::WrongCredentials);
        }

        let password_hash = hash_password(&request.new_password)?;
        self.admin_repo.update_password(&password_hash, Utc::now()).await?;
        tracing::info!("admin password changed");
        self.open_session()
    }

    /// Trades the recovery key for a short-lived reset token.
    pub fn request_reset(&self, request: PasswordResetRequest, client_ip: &str) -> Result<ResetTokenResponse, AuthError> {
        self.limiter
            .check(&format!("reset:{}", client_ip))
            .map_err(AuthError::RateLimited)?;
        request.validate().map_err(|_| AuthError::InvalidRecoveryKey)?;

        if !keys_match(&request.recovery_key, &self.recovery_key) {
            tracing::warn!(client_ip, "password reset requested with a wrong recovery key");
            return Err(AuthError::InvalidRecoveryKey);
        }

        let (reset_token, expires_at) = self.reset_tokens.issue(Utc::now());
        tracing::info!(%expires_at, "password reset token issued");
        Ok(ResetTokenResponse { reset_token, expires_at })
    }

    pub fn verify_reset(&self, request: &ResetTokenRequest) -> Result<ResetTokenStatus, AuthError> {
        request.validate().map_err(|_| AuthError::InvalidResetToken)?;
        self.reset_tokens
            .check(&request.reset_token, Utc::now())
            .map(|expires_at| ResetTokenStatus { valid: true, expires_at })
            .ok_or(AuthError::InvalidResetToken)
    }

    /// Sets a new password with a reset token. The token is spent and every
    /// earlier session ends.
    pub async fn confirm_reset(&self, request: ConfirmPasswordReset) -> Result<(), AuthError> {
        request.validate()?;

        if self.reset_tokens.check(&request.reset_token, Utc::now()).is_none() {
            return Err(AuthError::InvalidResetToken);
        }
        let password_hash = hash_password(&request.new_password)?;
        if !self.reset_tokens.consume(&request.reset_token, Utc::now()) {
            return Err(AuthError::InvalidResetToken);
        }

        self.admin_repo.update_password(&password_hash, Utc::now()).await?;
        tracing::info!("admin password reset");
        Ok(())
    }

    /// Periodic cleanup of expired reset tokens, revocations and idle
    /// limiter entries.
    pub fn sweep(&self) -> (usize, usize, usize) {
        (
            self.reset_tokens.purge_expired(Utc::now()),
            self.revocations.purge_expired(),
            self.limiter.evict_idle(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt::JwtService,
        entities::admin::AdminAccount,
        repositories::admin::MockAdminRepository,
        settings::tests::test_config,
    };
    use chrono::{Duration, DurationRound};

    const PASSWORD: &str = "Adm1n!Portfolio#2024";
    const NEW_PASSWORD: &str = "Sl1c3r&Nozzle#Bed";

    fn account(changed_at: DateTime<Utc>) -> AdminAccount {
        AdminAccount {
            id: 1,
            password_hash: hash_password(PASSWORD).unwrap(),
            password_changed_at: changed_at,
            updated_at: changed_at,
        }
    }

    fn handler(repo: MockAdminRepository) -> AuthHandler<MockAdminRepository, JwtService> {
        let config = test_config();
        AuthHandler::new(
            repo,
            JwtService::new(&config),
            RevocationStore::in_memory(),
            ResetTokenStore::new(Duration::minutes(15)),
            LoginLimiter::per_minute(3),
            &config.admin_recovery_key,
        )
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest { password: password.to_string() }
    }

    #[actix_rt::test]
    async fn login_then_authenticate() {
        let stored = account(Utc::now() - Duration::days(1));
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().returning(move || Ok(Some(stored.clone())));

        let handler = handler(repo);
        let response = handler.login(login_request(PASSWORD), "10.0.0.1").await.unwrap();

        assert_eq!(response.token_type, "X-Admin-Token");
        assert!(handler.authenticate(&response.token).await.is_ok());
    }

    #[actix_rt::test]
    async fn wrong_password_and_rate_limit() {
        let stored = account(Utc::now());
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().returning(move || Ok(Some(stored.clone())));

        let handler = handler(repo);
        for _ in 0..3 {
            let err = handler.login(login_request("nope"), "10.0.0.9").await.unwrap_err();
            assert!(matches!(err, AuthError::WrongCredentials));
        }
        let err = handler.login(login_request(PASSWORD), "10.0.0.9").await.unwrap_err();
        assert!(matches!(err, AuthError::RateLimited(_)));
    }

    #[actix_rt::test]
    async fn logout_revokes_session() {
        let stored = account(Utc::now() - Duration::days(1));
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().returning(move || Ok(Some(stored.clone())));

        let handler = handler(repo);
        let response = handler.login(login_request(PASSWORD), "10.0.0.2").await.unwrap();
        let claims = handler.authenticate(&response.token).await.unwrap();

        handler.logout(&claims).await.unwrap();
        assert!(matches!(
            handler.authenticate(&response.token).await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[actix_rt::test]
    async fn sessions_before_password_change_are_expired() {
        let config = test_config();
        let tokens = JwtService::new(&config);
        let (old_token, _) = tokens.create_session(Utc::now() - Duration::minutes(5)).unwrap();

        let stored = account(Utc::now() - Duration::minutes(1));
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().returning(move || Ok(Some(stored.clone())));

        let handler = handler(repo);
        assert!(matches!(handler.authenticate(&old_token).await, Err(AuthError::SessionExpired)));
        assert!(matches!(handler.authenticate("garbage").await, Err(AuthError::SessionExpired)));
    }

    #[actix_rt::test]
    async fn password_change_in_the_same_second_still_ends_older_sessions() {
        let second = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();
        let changed_at = second + Duration::milliseconds(600);

        let config = test_config();
        let tokens = JwtService::new(&config);
        let (earlier, earlier_claims) = tokens.create_session(second + Duration::milliseconds(200)).unwrap();
        let (fresh, fresh_claims) = tokens.create_session(changed_at).unwrap();
        assert_eq!(earlier_claims.iat, fresh_claims.iat);

        let stored = account(changed_at);
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().returning(move || Ok(Some(stored.clone())));

        let handler = handler(repo);
        assert!(matches!(handler.authenticate(&earlier).await, Err(AuthError::SessionExpired)));
        assert!(handler.authenticate(&fresh).await.is_ok());
    }

    #[actix_rt::test]
    async fn reset_flow_spends_token() {
        let mut repo = MockAdminRepository::new();
        repo.expect_update_password()
            .times(1)
            .returning(|hash, changed_at| {
                let mut updated = account(changed_at);
                updated.password_hash = hash.to_string();
                Ok(updated)
            });

        let handler = handler(repo);
        let wrong = handler.request_reset(
            PasswordResetRequest { recovery_key: "guess".into() },
            "10.0.0.3",
        );
        assert!(matches!(wrong, Err(AuthError::InvalidRecoveryKey)));

        let issued = handler
            .request_reset(
                PasswordResetRequest { recovery_key: "recovery-key-for-tests-only".into() },
                "10.0.0.3",
            )
            .unwrap();
        let status = handler
            .verify_reset(&ResetTokenRequest { reset_token: issued.reset_token.clone() })
            .unwrap();
        assert!(status.valid);

        let weak = handler
            .confirm_reset(ConfirmPasswordReset {
                reset_token: issued.reset_token.clone(),
                new_password: "password".into(),
            })
            .await;
        assert!(matches!(weak, Err(AuthError::WeakPassword(_))));

        handler
            .confirm_reset(ConfirmPasswordReset {
                reset_token: issued.reset_token.clone(),
                new_password: NEW_PASSWORD.into(),
            })
            .await
            .unwrap();

        let reused = handler
            .confirm_reset(ConfirmPasswordReset {
                reset_token: issued.reset_token,
                new_password: NEW_PASSWORD.into(),
            })
            .await;
        assert!(matches!(reused, Err(AuthError::InvalidResetToken)));
    }

    #[actix_rt::test]
    async fn bootstrap_only_when_missing() {
        let mut repo = MockAdminRepository::new();
        repo.expect_get_account().times(1).returning(|| Ok(None));
        repo.expect_create_account()
            .withf(|hash| hash.starts_with("$argon2id$"))
            .times(1)
            .returning(|_| Ok(true));

        let handler = handler(repo);
        assert!(handler.ensure_account(Some(PASSWORD)).await.unwrap());
    }

    #[test]
    fn recovery_keys_compare_exactly() {
        assert!(keys_match("abc", "abc"));
        assert!(!keys_match("abc", "abd"));
        assert!(!keys_match("abc", "abcd"));
    }
}
