use crate::{
    entities::admin::DashboardSummary,
    errors::AppError,
    repositories::{
        achievement::AchievementRepository, filter_category::FilterCategoryRepository,
        project::ProjectRepository, testimonial::TestimonialRepository,
    },
};

/// Collects the admin dashboard counts. Reads go straight to the store.
pub async fn dashboard_summary(
    projects: &impl ProjectRepository,
    filters: &impl FilterCategoryRepository,
    achievements: &impl AchievementRepository,
    testimonials: &impl TestimonialRepository,
) -> Result<DashboardSummary, AppError> {
    let ((total, published, featured), categories, achievement_list, testimonial_list) = futures::try_join!(
        projects.count_projects(),
        filters.list_categories(),
        achievements.list_achievements(false),
        testimonials.list_testimonials(false),
    )?;

    Ok(DashboardSummary {
        projects: total,
        published_projects: published,
        featured_projects: featured,
        filter_categories: categories.len(),
        achievements: achievement_list.len(),
        testimonials: testimonial_list.len(),
        featured_testimonials: testimonial_list.iter().filter(|t| t.featured).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        achievement::MockAchievementRepository, filter_category::MockFilterCategoryRepository,
        project::MockProjectRepository, testimonial::MockTestimonialRepository,
    };

    #[actix_rt::test]
    async fn counts_are_collected() {
        let mut projects = MockProjectRepository::new();
        projects.expect_count_projects().returning(|| Ok((7, 5, 3)));
        let mut filters = MockFilterCategoryRepository::new();
        filters.expect_list_categories().returning(|| Ok(Vec::new()));
        let mut achievements = MockAchievementRepository::new();
        achievements
            .expect_list_achievements()
            .withf(|published_only| !*published_only)
            .returning(|_| Ok(Vec::new()));
        let mut testimonials = MockTestimonialRepository::new();
        testimonials.expect_list_testimonials().returning(|_| Ok(Vec::new()));

        let summary = dashboard_summary(&projects, &filters, &achievements, &testimonials)
            .await
            .unwrap();
        assert_eq!((summary.projects, summary.published_projects, summary.featured_projects), (7, 5, 3));
        assert_eq!(summary.testimonials, 0);
    }
}
