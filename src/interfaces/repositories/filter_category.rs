use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::{
    entities::filter_category::{FilterCategory, FilterCategoryInsert, FilterCategoryRow},
    errors::AppError,
    repositories::sqlx_repo::SqlxFilterCategoryRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilterCategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<FilterCategory>, AppError>;
    async fn get_category(&self, id: &str) -> Result<Option<FilterCategory>, AppError>;
    async fn upsert_category(&self, category: &FilterCategoryInsert) -> Result<FilterCategory, AppError>;
    /// Removes the category and returns what it held.
    async fn delete_category(&self, id: &str) -> Result<FilterCategory, AppError>;
}

impl SqlxFilterCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxFilterCategoryRepo { pool }
    }
}

#[async_trait]
impl FilterCategoryRepository for SqlxFilterCategoryRepo {
    async fn list_categories(&self) -> Result<Vec<FilterCategory>, AppError> {
        let rows = sqlx::query_as::<_, FilterCategoryRow>(
            "SELECT * FROM filter_categories ORDER BY sort_order ASC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FilterCategory::from).collect())
    }

    async fn get_category(&self, id: &str) -> Result<Option<FilterCategory>, AppError> {
        let row = sqlx::query_as::<_, FilterCategoryRow>("SELECT * FROM filter_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FilterCategory::from))
    }

    async fn upsert_category(&self, category: &FilterCategoryInsert) -> Result<FilterCategory, AppError> {
        let row = sqlx::query_as::<_, FilterCategoryRow>(
            r#"
            INSERT INTO filter_categories (id, name, name_cs, sort_order, options)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                name_cs = EXCLUDED.name_cs,
                sort_order = EXCLUDED.sort_order,
                options = EXCLUDED.options,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.name_cs)
        .bind(category.sort_order)
        .bind(Json(&category.options))
        .fetch_one(&self.pool)
        .await?;

        Ok(FilterCategory::from(row))
    }

    async fn delete_category(&self, id: &str) -> Result<FilterCategory, AppError> {
        let row = sqlx::query_as::<_, FilterCategoryRow>("DELETE FROM filter_categories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Filter category not found".into()))?;

        Ok(FilterCategory::from(row))
    }
}
