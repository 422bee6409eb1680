use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxFilterCategoryRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAchievementRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxTestimonialRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxContentRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAdminRepo {
    pub pool: PgPool,
}
