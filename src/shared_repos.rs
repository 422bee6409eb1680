use crate::repositories::sqlx_repo::{
    SqlxAchievementRepo, SqlxAdminRepo, SqlxContentRepo, SqlxFilterCategoryRepo, SqlxProjectRepo,
    SqlxTestimonialRepo,
};

#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: SqlxProjectRepo,
    pub filter_repo: SqlxFilterCategoryRepo,
    pub achievement_repo: SqlxAchievementRepo,
    pub testimonial_repo: SqlxTestimonialRepo,
    pub content_repo: SqlxContentRepo,
    pub admin_repo: SqlxAdminRepo,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            project_repo: SqlxProjectRepo::new(pool.clone()),
            filter_repo: SqlxFilterCategoryRepo::new(pool.clone()),
            achievement_repo: SqlxAchievementRepo::new(pool.clone()),
            testimonial_repo: SqlxTestimonialRepo::new(pool.clone()),
            content_repo: SqlxContentRepo::new(pool.clone()),
            admin_repo: SqlxAdminRepo::new(pool),
        }
    }
}
