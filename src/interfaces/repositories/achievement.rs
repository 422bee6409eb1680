use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    entities::achievement::{Achievement, AchievementInput, AchievementRow},
    errors::AppError,
    repositories::sqlx_repo::SqlxAchievementRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    async fn list_achievements(&self, published_only: bool) -> Result<Vec<Achievement>, AppError>;
    async fn get_achievement(&self, id: Uuid, published_only: bool) -> Result<Achievement, AppError>;
    async fn upsert_achievement(&self, id: Uuid, input: &AchievementInput) -> Result<Achievement, AppError>;
    async fn delete_achievement(&self, id: Uuid) -> Result<(), AppError>;
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Achievement, AppError>;
}

impl SqlxAchievementRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxAchievementRepo { pool }
    }
}

#[async_trait]
impl AchievementRepository for SqlxAchievementRepo {
    async fn list_achievements(&self, published_only: bool) -> Result<Vec<Achievement>, AppError> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r#"
            SELECT * FROM achievements
            WHERE ($1 = FALSE OR published = TRUE)
            ORDER BY date_value DESC, created_at DESC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Achievement::try_from).collect()
    }

    async fn get_achievement(&self, id: Uuid, published_only: bool) -> Result<Achievement, AppError> {
        let row = sqlx::query_as::<_, AchievementRow>(
            "SELECT * FROM achievements WHERE id = $1 AND ($2 = FALSE OR published = TRUE)",
        )
        .bind(id)
        .bind(published_only)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Achievement not found".into()))?;

        Achievement::try_from(row)
    }

    async fn upsert_achievement(&self, id: Uuid, input: &AchievementInput) -> Result<Achievement, AppError> {
        let row = sqlx::query_as::<_, AchievementRow>(
            r#"
            INSERT INTO achievements (
                id, kind, title, title_cs, description, description_cs,
                date_label, date_value, details, published, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                title = EXCLUDED.title,
                title_cs = EXCLUDED.title_cs,
                description = EXCLUDED.description,
                description_cs = EXCLUDED.description_cs,
                date_label = EXCLUDED.date_label,
                date_value = EXCLUDED.date_value,
                details = EXCLUDED.details,
                published = EXCLUDED.published,
                sort_order = EXCLUDED.sort_order,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.details.kind())
        .bind(&input.title)
        .bind(&input.title_cs)
        .bind(&input.description)
        .bind(&input.description_cs)
        .bind(&input.date)
        .bind(input.date_value)
        .bind(Json(&input.details))
        .bind(input.published)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await?;

        Achievement::try_from(row)
    }

    async fn delete_achievement(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM achievements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Achievement not found".into()));
        }
        Ok(())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Achievement, AppError> {
        let row = sqlx::query_as::<_, AchievementRow>(
            "UPDATE achievements SET published = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Achievement not found".into()))?;

        Achievement::try_from(row)
    }
}
