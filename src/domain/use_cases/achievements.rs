use validator::Validate;

use crate::{
    cache::PublicCaches,
    entities::achievement::{sort_for_display, Achievement, AchievementInput},
    errors::AppError,
    repositories::achievement::AchievementRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct AchievementHandler<R>
where
    R: AchievementRepository,
{
    pub achievement_repo: R,
    caches: PublicCaches,
}

impl<R> AchievementHandler<R>
where
    R: AchievementRepository,
{
    pub fn new(achievement_repo: R, caches: PublicCaches) -> Self {
        AchievementHandler { achievement_repo, caches }
    }

    /// Published achievements, manual order first, then newest.
    pub async fn list_public(&self) -> Result<Vec<Achievement>, AppError> {
        let cached = self
            .caches
            .achievements
            .get_or_load(|| self.achievement_repo.list_achievements(true))
            .await?;

        let mut achievements = cached.as_ref().clone();
        sort_for_display(&mut achievements);
        Ok(achievements)
    }

    pub async fn get_public(&self, id: &str) -> Result<Achievement, AppError> {
        let id = valid_uuid(id)?;
        self.caches
            .achievements
            .get_or_load(|| self.achievement_repo.list_achievements(true))
            .await?
            .iter()
            .find(|achievement| achievement.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Achievement not found".into()))
    }

    pub async fn list_admin(&self) -> Result<Vec<Achievement>, AppError> {
        let mut achievements = self.achievement_repo.list_achievements(false).await?;
        sort_for_display(&mut achievements);
        Ok(achievements)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn save(&self, id: &str, input: AchievementInput) -> Result<Achievement, AppError> {
        let id = valid_uuid(id)?;
        let input = input.normalized();
        input.validate()?;

        let achievement = self.achievement_repo.upsert_achievement(id, &input).await?;
        self.caches.achievements.invalidate();
        tracing::info!(achievement_id = %achievement.id, kind = achievement.details.kind(), "achievement saved");
        Ok(achievement)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.achievement_repo.delete_achievement(id).await?;
        self.caches.achievements.invalidate();
        Ok(())
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Achievement, AppError> {
        let id = valid_uuid(id)?;
        let achievement = self.achievement_repo.set_published(id, published).await?;
        self.caches.achievements.invalidate();
        Ok(achievement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::achievement::MockAchievementRepository;
    use std::time::Duration;

    fn input(value: serde_json::Value) -> AchievementInput {
        serde_json::from_value(value).unwrap()
    }

    #[actix_rt::test]
    async fn invalid_details_never_reach_the_store() {
        let handler = AchievementHandler::new(
            MockAchievementRepository::new(),
            PublicCaches::new(Duration::from_secs(60)),
        );
        let payload = input(serde_json::json!({
            "type": "certification",
            "title": "Fusion 360 Associate",
            "dateValue": 202402,
            "issuer": "Autodesk",
            "certificateUrl": "not a url",
        }));

        let err = handler
            .save("0b7e3f0a-8d2f-4c55-9a47-3f0f5d1b2c11", payload)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn unknown_id_is_not_found() {
        let mut repo = MockAchievementRepository::new();
        repo.expect_list_achievements().times(1).returning(|_| Ok(Vec::new()));

        let handler = AchievementHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let err = handler
            .get_public("0b7e3f0a-8d2f-4c55-9a47-3f0f5d1b2c11")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
