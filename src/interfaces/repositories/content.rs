use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::{
    entities::{
        content::{SiteContent, SiteContentRow},
        site_settings::{SiteSettings, SiteSettingsRow},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxContentRepo,
};

/// The two singleton documents: site copy and site settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn get_content(&self) -> Result<SiteContent, AppError>;
    async fn replace_content(&self, content: &SiteContent) -> Result<SiteContent, AppError>;
    async fn get_settings(&self) -> Result<SiteSettings, AppError>;
    async fn update_settings(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError>;
}

impl SqlxContentRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxContentRepo { pool }
    }
}

#[async_trait]
impl ContentRepository for SqlxContentRepo {
    async fn get_content(&self) -> Result<SiteContent, AppError> {
        let row = sqlx::query_as::<_, SiteContentRow>("SELECT content, updated_at FROM site_content WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SiteContent::from).unwrap_or_default())
    }

    async fn replace_content(&self, content: &SiteContent) -> Result<SiteContent, AppError> {
        let row = sqlx::query_as::<_, SiteContentRow>(
            r#"
            INSERT INTO site_content (id, content) VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING content, updated_at
            "#,
        )
        .bind(Json(&content.values))
        .fetch_one(&self.pool)
        .await?;

        Ok(SiteContent::from(row))
    }

    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        let row = sqlx::query_as::<_, SiteSettingsRow>(
            "SELECT web_default_sort_order, admin_default_sort_order, updated_at FROM site_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => SiteSettings::try_from(row),
            None => Ok(SiteSettings::default()),
        }
    }

    async fn update_settings(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError> {
        let row = sqlx::query_as::<_, SiteSettingsRow>(
            r#"
            INSERT INTO site_settings (id, web_default_sort_order, admin_default_sort_order)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE SET
                web_default_sort_order = EXCLUDED.web_default_sort_order,
                admin_default_sort_order = EXCLUDED.admin_default_sort_order,
                updated_at = NOW()
            RETURNING web_default_sort_order, admin_default_sort_order, updated_at
            "#,
        )
        .bind(settings.web_default_sort_order.as_str())
        .bind(settings.admin_default_sort_order.as_str())
        .fetch_one(&self.pool)
        .await?;

        SiteSettings::try_from(row)
    }
}
