use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::password::validate_password_strength;

/// The single admin account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminAccount {
    pub id: i16,
    pub password_hash: String,
    pub password_changed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[validate(length(min = 1, message = "Recovery key is required"))]
    pub recovery_key: String,
}

#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub reset_token: String,
}

#[derive(Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPasswordReset {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub reset_token: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub reset_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenStatus {
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub projects: i64,
    pub published_projects: i64,
    pub featured_projects: i64,
    pub filter_categories: usize,
    pub achievements: usize,
    pub testimonials: usize,
    pub featured_testimonials: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_new_password_is_rejected() {
        let request = ConfirmPasswordReset { reset_token: "abc".into(), new_password: "password".into() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_password"));
    }

    #[test]
    fn strong_new_password_passes() {
        let request = ChangePasswordRequest {
            current_password: "old".into(),
            new_password: "Tr1cky!Filament#Spool".into(),
        };
        assert!(request.validate().is_ok());
    }
}
