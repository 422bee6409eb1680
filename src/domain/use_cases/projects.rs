use std::{collections::HashSet, sync::Arc};

use validator::Validate;

use crate::{
    cache::PublicCaches,
    entities::{
        content::Language,
        filter_category::FilterCategory,
        project::{LocalizedProject, Project, ProjectDetail, ProjectInput},
        site_settings::SiteSettings,
    },
    errors::AppError,
    listing::{
        featured::MAX_FEATURED, filter_items, reorder::plan_sort_orders, sort_items, FeaturedToggle,
        ReorderOutcome, SortMode,
    },
    repositories::{
        content::ContentRepository, filter_category::FilterCategoryRepository, project::ProjectRepository,
    },
    utils::valid_uuid::valid_uuid,
};

/// Runs the filter-then-sort pipeline over a fetched collection.
pub fn derive_listing(
    projects: &[Project],
    categories: &[FilterCategory],
    selection: &HashSet<String>,
    mode: SortMode,
    lang: Language,
) -> Vec<Project> {
    let localized: Vec<LocalizedProject> = projects
        .iter()
        .cloned()
        .map(|project| LocalizedProject { project, lang })
        .collect();

    let filtered = filter_items(localized, selection, categories);
    sort_items(&filtered, mode)
        .into_iter()
        .map(|item| item.project)
        .collect()
}

pub struct ProjectHandler<P, F, C>
where
    P: ProjectRepository,
    F: FilterCategoryRepository,
    C: ContentRepository,
{
    pub project_repo: P,
    pub filter_repo: F,
    pub content_repo: C,
    caches: PublicCaches,
}

impl<P, F, C> ProjectHandler<P, F, C>
where
    P: ProjectRepository,
    F: FilterCategoryRepository,
    C: ContentRepository,
{
    pub fn new(project_repo: P, filter_repo: F, content_repo: C, caches: PublicCaches) -> Self {
        ProjectHandler {
            project_repo,
            filter_repo,
            content_repo,
            caches,
        }
    }

    async fn published(&self) -> Result<Arc<Vec<Project>>, AppError> {
        self.caches
            .projects
            .get_or_load(|| self.project_repo.list_projects(true))
            .await
    }

    async fn categories(&self) -> Result<Arc<Vec<FilterCategory>>, AppError> {
        self.caches
            .filters
            .get_or_load(|| self.filter_repo.list_categories())
            .await
    }

    async fn settings(&self) -> Result<Arc<SiteSettings>, AppError> {
        self.caches
            .settings
            .get_or_load(|| self.content_repo.get_settings())
            .await
    }

    /// Published projects as the public site lists them.
    #[tracing::instrument(skip(self))]
    pub async fn list_public(
        &self,
        selection: &HashSet<String>,
        sort: Option<SortMode>,
        lang: Language,
    ) -> Result<Vec<Project>, AppError> {
        let projects = self.published().await?;
        let categories = self.categories().await?;
        let mode = self.settings().await?.web_sort(sort);

        Ok(derive_listing(&projects, &categories, selection, mode, lang))
    }

    /// Every project, drafts included, in the admin's chosen order.
    pub async fn list_admin(
        &self,
        selection: &HashSet<String>,
        sort: Option<SortMode>,
    ) -> Result<Vec<Project>, AppError> {
        let projects = self.project_repo.list_projects(false).await?;
        let categories = self.filter_repo.list_categories().await?;
        let mode = self.content_repo.get_settings().await?.admin_sort(sort);

        Ok(derive_listing(&projects, &categories, selection, mode, Language::En))
    }

    /// At most three featured projects, in the public default order.
    pub async fn featured(&self) -> Result<Vec<Project>, AppError> {
        let projects = self.published().await?;
        let mode = self.settings().await?.web_sort(None);

        let featured: Vec<Project> = projects.iter().filter(|p| p.featured).cloned().collect();
        let mut sorted = sort_items(&featured, mode);
        sorted.truncate(MAX_FEATURED);
        Ok(sorted)
    }

    pub async fn get_public(&self, id: &str) -> Result<ProjectDetail, AppError> {
        let id = valid_uuid(id)?;
        self.published()
            .await?
            .iter()
            .find(|project| project.id == id)
            .cloned()
            .map(Project::into_detail)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    /// Creates or replaces a project. Returns it and whether it is new.
    #[tracing::instrument(skip(self, input))]
    pub async fn save(&self, id: &str, input: ProjectInput) -> Result<(Project, bool), AppError> {
        let id = valid_uuid(id)?;
        let input = input.normalized();
        input.validate()?;

        let (project, created) = self.project_repo.upsert_project(id, &input).await?;
        self.caches.projects.invalidate();

        tracing::info!(project_id = %project.id, created, "project saved");
        Ok((project, created))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.project_repo.delete_project(id).await?;
        self.caches.projects.invalidate();

        tracing::info!(project_id = %id, "project deleted");
        Ok(())
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Project, AppError> {
        let id = valid_uuid(id)?;
        let project = self.project_repo.set_published(id, published).await?;
        self.caches.projects.invalidate();
        Ok(project)
    }

    /// Featuring a fourth project is refused and changes nothing.
    pub async fn set_featured(&self, id: &str, featured: bool) -> Result<Project, AppError> {
        let id = valid_uuid(id)?;
        match self.project_repo.set_featured_capped(id, featured).await? {
            FeaturedToggle::Updated(project) => {
                self.caches.projects.invalidate();
                Ok(project)
            }
            FeaturedToggle::CapReached { featured } => {
                tracing::info!(project_id = %id, featured, "featured cap reached");
                Err(AppError::Conflict(format!(
                    "At most {} projects can be featured; unfeature one first",
                    MAX_FEATURED
                )))
            }
        }
    }

    /// Saves the manual order: every listed project gets its index.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn reorder(&self, ids: &[uuid::Uuid]) -> Result<ReorderOutcome, AppError> {
        let plan = plan_sort_orders(ids)?;
        let updated = self.project_repo.apply_sort_orders(&plan).await?;
        self.caches.projects.invalidate();

        let outcome = ReorderOutcome::from_updates(&plan, &updated);
        if let Some(warning) = &outcome.warning {
            tracing::warn!(missing = outcome.missing.len(), "{}", warning);
        }
        Ok(outcome)
    }
}
