use crate::{
    cache::PublicCaches,
    entities::{
        content::{Language, ResolvedContent, SiteContent},
        site_settings::SiteSettings,
    },
    errors::AppError,
    repositories::content::ContentRepository,
};

pub struct ContentHandler<R>
where
    R: ContentRepository,
{
    pub content_repo: R,
    caches: PublicCaches,
}

impl<R> ContentHandler<R>
where
    R: ContentRepository,
{
    pub fn new(content_repo: R, caches: PublicCaches) -> Self {
        ContentHandler { content_repo, caches }
    }

    /// Every content key resolved for one language, defaults filled in.
    pub async fn resolved(&self, lang: Language) -> Result<ResolvedContent, AppError> {
        let content = self
            .caches
            .content
            .get_or_load(|| self.content_repo.get_content())
            .await?;

        Ok(ResolvedContent {
            lang,
            content: content.resolve_all(lang),
        })
    }

    /// The raw bag for the admin editor.
    pub async fn raw(&self) -> Result<SiteContent, AppError> {
        self.content_repo.get_content().await
    }

    /// Replaces the whole bag. Blank values are dropped so that the
    /// language default shows again.
    #[tracing::instrument(skip(self, content), fields(fields = content.values.len()))]
    pub async fn replace(&self, mut content: SiteContent) -> Result<SiteContent, AppError> {
        content.values.retain(|_, value| !value.trim().is_empty());
        content.validate()?;

        let stored = self.content_repo.replace_content(&content).await?;
        self.caches.content.invalidate();
        Ok(stored)
    }

    pub async fn settings(&self) -> Result<SiteSettings, AppError> {
        self.content_repo.get_settings().await
    }

    pub async fn update_settings(&self, settings: SiteSettings) -> Result<SiteSettings, AppError> {
        let stored = self.content_repo.update_settings(&settings).await?;
        self.caches.settings.invalidate();
        tracing::info!(
            web = stored.web_default_sort_order.as_str(),
            admin = stored.admin_default_sort_order.as_str(),
            "site settings updated"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listing::SortMode, repositories::content::MockContentRepository};
    use std::{collections::BTreeMap, time::Duration};

    fn bag(pairs: &[(&str, &str)]) -> SiteContent {
        SiteContent {
            values: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
        }
    }

    #[actix_rt::test]
    async fn resolved_content_falls_back_per_language() {
        let mut repo = MockContentRepository::new();
        repo.expect_get_content()
            .times(1)
            .returning(|| Ok(bag(&[("heroTitle", "Parts that fit")])));

        let handler = ContentHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let english = handler.resolved(Language::En).await.unwrap();
        let czech = handler.resolved(Language::Cs).await.unwrap();

        assert_eq!(english.content["heroTitle"], "Parts that fit");
        assert_ne!(czech.content["heroTitle"], "Parts that fit");
        assert!(!czech.content["heroTitle"].is_empty());
    }

    #[actix_rt::test]
    async fn replace_drops_blanks_and_rejects_unknown_keys() {
        let mut repo = MockContentRepository::new();
        repo.expect_replace_content()
            .withf(|content| !content.values.contains_key("heroSubtitle"))
            .times(1)
            .returning(|content| Ok(content.clone()));

        let handler = ContentHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let stored = handler
            .replace(bag(&[("heroTitle", "Hi"), ("heroSubtitle", "  ")]))
            .await
            .unwrap();
        assert_eq!(stored.values.len(), 1);

        let err = handler.replace(bag(&[("favouriteColour", "teal")])).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn settings_update_round_trips() {
        let mut repo = MockContentRepository::new();
        repo.expect_update_settings().returning(|settings| Ok(*settings));

        let handler = ContentHandler::new(repo, PublicCaches::new(Duration::from_secs(60)));
        let updated = handler
            .update_settings(SiteSettings {
                web_default_sort_order: SortMode::DifficultyHard,
                admin_default_sort_order: SortMode::None,
            })
            .await
            .unwrap();
        assert_eq!(updated.web_default_sort_order, SortMode::DifficultyHard);
    }
}
