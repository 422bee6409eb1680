use std::time::Duration;

use deadpool_redis::{Config as RedisConfig, Pool as RedisPool, Runtime};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;
pub mod client;

pub use domain::{entities, listing, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, cache, db, limiter, storage, utils};

use auth::{jwt::JwtService, reset_tokens::ResetTokenStore, revocation::RevocationStore};
use cache::PublicCaches;
use limiter::login_limiter::LoginLimiter;
use repositories::sqlx_repo::{
    SqlxAchievementRepo, SqlxAdminRepo, SqlxContentRepo, SqlxFilterCategoryRepo, SqlxProjectRepo,
    SqlxTestimonialRepo,
};
use shared_repos::SharedRepositories;
use storage::local::LocalStorage;
use use_cases::{
    achievements::AchievementHandler, auth::AuthHandler, content::ContentHandler, filters::FilterHandler,
    projects::ProjectHandler, testimonials::TestimonialHandler,
};

pub type AppAuthHandler = AuthHandler<SqlxAdminRepo, JwtService>;
pub type AppProjectHandler = ProjectHandler<SqlxProjectRepo, SqlxFilterCategoryRepo, SqlxContentRepo>;
pub type AppFilterHandler = FilterHandler<SqlxFilterCategoryRepo, SqlxProjectRepo>;
pub type AppAchievementHandler = AchievementHandler<SqlxAchievementRepo>;
pub type AppTestimonialHandler = TestimonialHandler<SqlxTestimonialRepo>;
pub type AppContentHandler = ContentHandler<SqlxContentRepo>;
pub type AppStorage = LocalStorage<JwtService>;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub project_handler: AppProjectHandler,
    pub filter_handler: AppFilterHandler,
    pub achievement_handler: AppAchievementHandler,
    pub testimonial_handler: AppTestimonialHandler,
    pub content_handler: AppContentHandler,
    pub storage: AppStorage,
    pub repos: SharedRepositories,
    pub caches: PublicCaches,
    pub redis_pool: Option<RedisPool>,
    pub anon_key: Option<String>,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let jwt_service = JwtService::new(config);
        let repos = SharedRepositories::new(pool);
        let caches = PublicCaches::new(Duration::from_secs(config.cache_ttl_secs));

        let redis_pool = config.redis_url.as_ref().and_then(|url| {
            RedisConfig::from_url(url.as_str())
                .create_pool(Some(Runtime::Tokio1))
                .map_err(|e| tracing::error!("Redis pool error: {}", e))
                .ok()
        });
        let revocations = match &redis_pool {
            Some(pool) => RevocationStore::Redis(pool.clone()),
            None => {
                tracing::info!("Redis not configured; session revocations are kept in memory");
                RevocationStore::in_memory()
            }
        };

        let auth_handler = AuthHandler::new(
            repos.admin_repo.clone(),
            jwt_service.clone(),
            revocations,
            ResetTokenStore::new(chrono::Duration::minutes(config.reset_token_ttl_minutes)),
            LoginLimiter::per_minute(config.login_attempts_per_minute),
            &config.admin_recovery_key,
        );

        AppState {
            auth_handler,
            project_handler: ProjectHandler::new(
                repos.project_repo.clone(),
                repos.filter_repo.clone(),
                repos.content_repo.clone(),
                caches.clone(),
            ),
            filter_handler: FilterHandler::new(repos.filter_repo.clone(), repos.project_repo.clone(), caches.clone()),
            achievement_handler: AchievementHandler::new(repos.achievement_repo.clone(), caches.clone()),
            testimonial_handler: TestimonialHandler::new(repos.testimonial_repo.clone(), caches.clone()),
            content_handler: ContentHandler::new(repos.content_repo.clone(), caches.clone()),
            storage: LocalStorage::new(config, jwt_service),
            repos,
            caches,
            redis_pool,
            anon_key: config.anon_key.clone().filter(|key| !key.is_empty()),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }
}
