use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{entities::admin::AdminAccount, errors::AppError, repositories::sqlx_repo::SqlxAdminRepo};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn get_account(&self) -> Result<Option<AdminAccount>, AppError>;
    /// Inserts the account unless one exists; returns whether it was created.
    async fn create_account(&self, password_hash: &str) -> Result<bool, AppError>;
    /// Stores a new hash. `changed_at` comes from the caller's clock so that
    /// sessions issued afterwards compare against the same clock.
    async fn update_password(&self, password_hash: &str, changed_at: DateTime<Utc>) -> Result<AdminAccount, AppError>;
}

impl SqlxAdminRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxAdminRepo { pool }
    }
}

#[async_trait]
impl AdminRepository for SqlxAdminRepo {
    async fn get_account(&self) -> Result<Option<AdminAccount>, AppError> {
        let account = sqlx::query_as::<_, AdminAccount>("SELECT * FROM admin_account WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn create_account(&self, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO admin_account (id, password_hash) VALUES (1, $1) ON CONFLICT (id) DO NOTHING",
        )
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_password(&self, password_hash: &str, changed_at: DateTime<Utc>) -> Result<AdminAccount, AppError> {
        let account = sqlx::query_as::<_, AdminAccount>(
            r#"
            UPDATE admin_account
            SET password_hash = $1, password_changed_at = $2, updated_at = NOW()
            WHERE id = 1
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(changed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin account not initialised".into()))?;
        Ok(account)
    }
}
