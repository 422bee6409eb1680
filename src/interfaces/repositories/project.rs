use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectInput, ProjectRow},
    errors::AppError,
    listing::{featured::decide_featured_toggle, FeaturedDecision, FeaturedToggle, SortAssignment},
    repositories::sqlx_repo::SqlxProjectRepo,
};

/// Advisory lock key serializing featured toggles on projects.
const FEATURED_LOCK_KEY: i64 = 0x5052_4f4a_4645_4154;

#[derive(Debug, sqlx::FromRow)]
struct UpsertedProjectRow {
    #[sqlx(flatten)]
    row: ProjectRow,
    inserted: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn list_projects(&self, published_only: bool) -> Result<Vec<Project>, AppError>;
    /// Creates or replaces a project. The flag is `true` when it was created.
    async fn upsert_project(&self, id: Uuid, input: &ProjectInput) -> Result<(Project, bool), AppError>;
    async fn delete_project(&self, id: Uuid) -> Result<(), AppError>;
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Project, AppError>;
    async fn set_featured_capped(&self, id: Uuid, featured: bool) -> Result<FeaturedToggle<Project>, AppError>;
    /// Writes the given sort orders and returns the ids that existed.
    async fn apply_sort_orders(&self, plan: &[SortAssignment]) -> Result<Vec<Uuid>, AppError>;
    async fn count_referencing_filters(&self, option_ids: &[String]) -> Result<i64, AppError>;
    /// Total, published and featured project counts.
    async fn count_projects(&self) -> Result<(i64, i64, i64), AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }

    async fn lock_featured(tx: &mut Transaction<'_, Postgres>) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(FEATURED_LOCK_KEY)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn list_projects(&self, published_only: bool) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT * FROM projects
            WHERE ($1 = FALSE OR published = TRUE)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn upsert_project(&self, id: Uuid, input: &ProjectInput) -> Result<(Project, bool), AppError> {
        // `featured` is left alone here; it only changes through the capped toggle.
        let upserted = sqlx::query_as::<_, UpsertedProjectRow>(
            r#"
            INSERT INTO projects (
                id, title, title_cs, description, description_cs, full_description,
                full_description_cs, project_category, material, printing_technology,
                design_source, difficulty, date_label, date_value, images, thumbnail_image,
                model_url, published, sort_order, filters
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                title_cs = EXCLUDED.title_cs,
                description = EXCLUDED.description,
                description_cs = EXCLUDED.description_cs,
                full_description = EXCLUDED.full_description,
                full_description_cs = EXCLUDED.full_description_cs,
                project_category = EXCLUDED.project_category,
                material = EXCLUDED.material,
                printing_technology = EXCLUDED.printing_technology,
                design_source = EXCLUDED.design_source,
                difficulty = EXCLUDED.difficulty,
                date_label = EXCLUDED.date_label,
                date_value = EXCLUDED.date_value,
                images = EXCLUDED.images,
                thumbnail_image = EXCLUDED.thumbnail_image,
                model_url = EXCLUDED.model_url,
                published = EXCLUDED.published,
                sort_order = EXCLUDED.sort_order,
                filters = EXCLUDED.filters,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.title_cs)
        .bind(&input.description)
        .bind(&input.description_cs)
        .bind(&input.full_description)
        .bind(&input.full_description_cs)
        .bind(&input.project_category)
        .bind(&input.material)
        .bind(input.printing_technology.as_str())
        .bind(input.design_source.as_str())
        .bind(input.difficulty.as_str())
        .bind(&input.date)
        .bind(input.date_value)
        .bind(&input.images)
        .bind(&input.thumbnail_image)
        .bind(&input.model_url)
        .bind(input.published)
        .bind(input.sort_order)
        .bind(&input.filters)
        .fetch_one(&self.pool)
        .await?;

        Ok((Project::try_from(upserted.row)?, upserted.inserted))
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".into()));
        }
        Ok(())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Project, AppError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "UPDATE projects SET published = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        Project::try_from(row)
    }

    async fn set_featured_capped(&self, id: Uuid, featured: bool) -> Result<FeaturedToggle<Project>, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_featured(&mut tx).await?;

        let current: bool = sqlx::query_scalar("SELECT featured FROM projects WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        let others: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE featured AND id <> $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let others = usize::try_from(others).unwrap_or(usize::MAX);

        let row = match decide_featured_toggle(others, current, featured) {
            FeaturedDecision::CapReached => {
                tx.rollback().await?;
                return Ok(FeaturedToggle::CapReached { featured: others });
            }
            FeaturedDecision::Unchanged => {
                sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?
            }
            FeaturedDecision::Apply => {
                sqlx::query_as::<_, ProjectRow>(
                    "UPDATE projects SET featured = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(id)
                .bind(featured)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(FeaturedToggle::Updated(Project::try_from(row)?))
    }

    async fn apply_sort_orders(&self, plan: &[SortAssignment]) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = plan.iter().map(|a| a.id).collect();
        let orders: Vec<i32> = plan.iter().map(|a| a.sort_order).collect();

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE projects AS p
            SET sort_order = u.sort_order, updated_at = NOW()
            FROM UNNEST($1::uuid[], $2::int4[]) AS u(id, sort_order)
            WHERE p.id = u.id
            RETURNING p.id
            "#,
        )
        .bind(&ids)
        .bind(&orders)
        .fetch_all(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn count_referencing_filters(&self, option_ids: &[String]) -> Result<i64, AppError> {
        if option_ids.is_empty() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE filters && $1::text[]")
            .bind(option_ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_projects(&self) -> Result<(i64, i64, i64), AppError> {
        let counts: (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE published), COUNT(*) FILTER (WHERE featured) FROM projects",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}
