use validator::Validate;

use crate::{
    cache::PublicCaches,
    entities::testimonial::{Testimonial, TestimonialInput},
    errors::AppError,
    listing::{FeaturedToggle, MAX_FEATURED},
    repositories::testimonial::TestimonialRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct TestimonialHandler<R>
where
    R: TestimonialRepository,
{
    pub testimonial_repo: R,
    caches: PublicCaches,
}

impl<R> TestimonialHandler<R>
where
    R: TestimonialRepository,
{
    pub fn new(testimonial_repo: R, caches: PublicCaches) -> Self {
        TestimonialHandler { testimonial_repo, caches }
    }

    pub async fn list_public(&self) -> Result<Vec<Testimonial>, AppError> {
        let cached = self
            .caches
            .testimonials
            .get_or_load(|| self.testimonial_repo.list_testimonials(true))
            .await?;
        Ok(cached.as_ref().clone())
    }

    pub async fn featured(&self) -> Result<Vec<Testimonial>, AppError> {
        let mut featured: Vec<Testimonial> = self
            .list_public()
            .await?
            .into_iter()
            .filter(|testimonial| testimonial.featured)
            .collect();
        featured.truncate(MAX_FEATURED);
        Ok(featured)
    }

    pub async fn list_admin(&self) -> Result<Vec<Testimonial>, AppError> {
        self.testimonial_repo.list_testimonials(false).await
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn save(&self, id: &str, input: TestimonialInput) -> Result<Testimonial, AppError> {
        let id = valid_uuid(id)?;
        let input = input.normalized();
        input.validate()?;

        let testimonial = self.testimonial_repo.upsert_testimonial(id, &input).await?;
        self.caches.testimonials.invalidate();
        Ok(testimonial)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.testimonial_repo.delete_testimonial(id).await?;
        self.caches.testimonials.invalidate();
        Ok(())
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Testimonial, AppError> {
        let id = valid_uuid(id)?;
        let testimonial = self.testimonial_repo.set_published(id, published).await?;
        self.caches.testimonials.invalidate();
        Ok(testimonial)
    }

    pub async fn set_featured(&self, id: &str, featured: bool) -> Result<Testimonial, AppError> {
        let id = valid_uuid(id)?;
        match self.testimonial_repo.set_featured_capped(id, featured).await? {
            FeaturedToggle::Updated(testimonial) => {
                self.caches.testimonials.invalidate();
                Ok(testimonial)
            }
            FeaturedToggle::CapReached { .. } => Err(AppError::Conflict(format!(
                "At most {} testimonials can be featured; unfeature one first",
                MAX_FEATURED
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::testimonial::TestimonialRow, repositories::testimonial::MockTestimonialRepository};
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn testimonial(name: &str, featured: bool) -> Testimonial {
        Testimonial::from(TestimonialRow {
            id: Uuid::new_v4(),
            client_name: name.into(),
            client_role: None,
            content: "Precise and quick.".into(),
            content_cs: None,
            rating: 5,
            project_id: None,
            published: true,
            featured,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[actix_rt::test]
    async fn featured_filters_cached_list() {
        let mut repo = MockTestimonialRepository::new();
        repo.expect_list_testimonials()
            .times(1)
            .returning(|_| Ok(vec![testimonial("A", true), testimonial("B", false), testimonial("C", true)]));

        let handler = TestimonialHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let names: Vec<String> = handler.featured().await.unwrap().into_iter().map(|t| t.client_name).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(handler.list_public().await.unwrap().len(), 3);
    }

    #[actix_rt::test]
    async fn cap_reached_is_a_conflict() {
        let mut repo = MockTestimonialRepository::new();
        repo.expect_set_featured_capped()
            .returning(|_, _| Ok(FeaturedToggle::CapReached { featured: 3 }));

        let handler = TestimonialHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let err = handler.set_featured(&Uuid::new_v4().to_string(), true).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
