use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entities::testimonial::{Testimonial, TestimonialInput, TestimonialRow},
    errors::AppError,
    listing::{featured::decide_featured_toggle, FeaturedDecision, FeaturedToggle},
    repositories::sqlx_repo::SqlxTestimonialRepo,
};

const FEATURED_LOCK_KEY: i64 = 0x5445_5354_4645_4154;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn list_testimonials(&self, published_only: bool) -> Result<Vec<Testimonial>, AppError>;
    async fn upsert_testimonial(&self, id: Uuid, input: &TestimonialInput) -> Result<Testimonial, AppError>;
    async fn delete_testimonial(&self, id: Uuid) -> Result<(), AppError>;
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Testimonial, AppError>;
    async fn set_featured_capped(&self, id: Uuid, featured: bool) -> Result<FeaturedToggle<Testimonial>, AppError>;
}

impl SqlxTestimonialRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxTestimonialRepo { pool }
    }
}

#[async_trait]
impl TestimonialRepository for SqlxTestimonialRepo {
    async fn list_testimonials(&self, published_only: bool) -> Result<Vec<Testimonial>, AppError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(
            r#"
            SELECT * FROM testimonials
            WHERE ($1 = FALSE OR published = TRUE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Testimonial::from).collect())
    }

    async fn upsert_testimonial(&self, id: Uuid, input: &TestimonialInput) -> Result<Testimonial, AppError> {
        let row = sqlx::query_as::<_, TestimonialRow>(
            r#"
            INSERT INTO testimonials (
                id, client_name, client_role, content, content_cs, rating, project_id, published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                client_name = EXCLUDED.client_name,
                client_role = EXCLUDED.client_role,
                content = EXCLUDED.content,
                content_cs = EXCLUDED.content_cs,
                rating = EXCLUDED.rating,
                project_id = EXCLUDED.project_id,
                published = EXCLUDED.published,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.client_name)
        .bind(&input.client_role)
        .bind(&input.content)
        .bind(&input.content_cs)
        .bind(input.rating)
        .bind(input.project_id)
        .bind(input.published)
        .fetch_one(&self.pool)
        .await?;

        Ok(Testimonial::from(row))
    }

    async fn delete_testimonial(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Testimonial not found".into()));
        }
        Ok(())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Testimonial, AppError> {
        let row = sqlx::query_as::<_, TestimonialRow>(
            "UPDATE testimonials SET published = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Testimonial not found".into()))?;

        Ok(Testimonial::from(row))
    }

    async fn set_featured_capped(&self, id: Uuid, featured: bool) -> Result<FeaturedToggle<Testimonial>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(FEATURED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let current: bool = sqlx::query_scalar("SELECT featured FROM testimonials WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Testimonial not found".into()))?;

        let others: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM testimonials WHERE featured AND id <> $1")
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
                sqlx::query_as::<_, TestimonialRow>("SELECT * FROM testimonials WHERE id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?
            }
            FeaturedDecision::Apply => {
                sqlx::query_as::<_, TestimonialRow>(
                    "UPDATE testimonials SET featured = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(id)
                .bind(featured)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(FeaturedToggle::Updated(Testimonial::from(row)))
    }
}
