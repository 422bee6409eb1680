use std::sync::Arc;

use crate::{
    cache::PublicCaches,
    entities::filter_category::{FilterCategory, FilterCategoryChange, FilterCategoryInput},
    errors::AppError,
    repositories::{filter_category::FilterCategoryRepository, project::ProjectRepository},
};

pub struct FilterHandler<F, P>
where
    F: FilterCategoryRepository,
    P: ProjectRepository,
{
    pub filter_repo: F,
    pub project_repo: P,
    caches: PublicCaches,
}

impl<F, P> FilterHandler<F, P>
where
    F: FilterCategoryRepository,
    P: ProjectRepository,
{
    pub fn new(filter_repo: F, project_repo: P, caches: PublicCaches) -> Self {
        FilterHandler {
            filter_repo,
            project_repo,
            caches,
        }
    }

    /// Categories in display order.
    pub async fn list(&self) -> Result<Arc<Vec<FilterCategory>>, AppError> {
        self.caches
            .filters
            .get_or_load(|| self.filter_repo.list_categories())
            .await
    }

    /// Creates or replaces a category. Options dropped by the write are
    /// reported together with the number of projects still tagged with them.
    #[tracing::instrument(skip(self, input))]
    pub async fn save(&self, id: &str, input: FilterCategoryInput) -> Result<FilterCategoryChange, AppError> {
        let insert = input.into_insert(id)?;
        let previous = self.filter_repo.get_category(id).await?;

        let category = self.filter_repo.upsert_category(&insert).await?;
        self.invalidate();

        let removed_option_ids: Vec<String> = previous
            .iter()
            .flat_map(|old| old.option_ids())
            .filter(|old_id| !category.option_ids().any(|new_id| new_id == *old_id))
            .map(str::to_string)
            .collect();
        let orphaned_projects = self.count_orphans(&removed_option_ids).await?;

        Ok(FilterCategoryChange {
            category: Some(category),
            removed_option_ids,
            orphaned_projects,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<FilterCategoryChange, AppError> {
        let removed = self.filter_repo.delete_category(id).await?;
        self.invalidate();

        let removed_option_ids: Vec<String> = removed.option_ids().map(str::to_string).collect();
        let orphaned_projects = self.count_orphans(&removed_option_ids).await?;

        Ok(FilterCategoryChange {
            category: None,
            removed_option_ids,
            orphaned_projects,
        })
    }

    async fn count_orphans(&self, option_ids: &[String]) -> Result<i64, AppError> {
        if option_ids.is_empty() {
            return Ok(0);
        }
        let count = self.project_repo.count_referencing_filters(option_ids).await?;
        if count > 0 {
            tracing::warn!(count, options = ?option_ids, "projects still reference removed filter options");
        }
        Ok(count)
    }

    // Project listings group selections by category, so they go stale too.
    fn invalidate(&self) {
        self.caches.filters.invalidate();
        self.caches.projects.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::filter_category::FilterOption,
        repositories::{filter_category::MockFilterCategoryRepository, project::MockProjectRepository},
    };
    use std::time::Duration;

    fn category(options: &[&str]) -> FilterCategory {
        FilterCategory {
            id: "material".into(),
            name: "Material".into(),
            name_cs: "Materiál".into(),
            sort_order: 0,
            options: options
                .iter()
                .map(|id| FilterOption { id: id.to_string(), label: id.to_string(), label_cs: id.to_string() })
                .collect(),
        }
    }

    fn input(labels: &[&str]) -> FilterCategoryInput {
        serde_json::from_value(serde_json::json!({
            "name": "Material",
            "options": labels.iter().map(|label| serde_json::json!({ "label": label })).collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[actix_rt::test]
    async fn dropped_options_report_orphans() {
        let mut filters = MockFilterCategoryRepository::new();
        filters
            .expect_get_category()
            .returning(|_| Ok(Some(category(&["pla", "petg", "abs"]))));
        filters
            .expect_upsert_category()
            .returning(|insert| Ok(category(&insert.options.iter().map(|o| o.id.as_str()).collect::<Vec<_>>())));

        let mut projects = MockProjectRepository::new();
        projects
            .expect_count_referencing_filters()
            .withf(|ids| ids.to_vec() == vec!["abs".to_string()])
            .times(1)
            .returning(|_| Ok(2));

        let handler = FilterHandler::new(filters, projects, PublicCaches::new(Duration::from_secs(60)));
        let change = handler.save("material", input(&["PLA", "PETG"])).await.unwrap();

        assert_eq!(change.removed_option_ids, vec!["abs".to_string()]);
        assert_eq!(change.orphaned_projects, 2);
        assert_eq!(change.category.unwrap().option_ids().collect::<Vec<_>>(), vec!["pla", "petg"]);
    }

    #[actix_rt::test]
    async fn new_category_has_nothing_to_orphan() {
        let mut filters = MockFilterCategoryRepository::new();
        filters.expect_get_category().returning(|_| Ok(None));
        filters.expect_upsert_category().returning(|_| Ok(category(&["pla"])));

        let handler = FilterHandler::new(
            filters,
            MockProjectRepository::new(),
            PublicCaches::new(Duration::from_secs(60)),
        );
        let change = handler.save("material", input(&["PLA"])).await.unwrap();

        assert!(change.removed_option_ids.is_empty());
        assert_eq!(change.orphaned_projects, 0);
    }

    #[actix_rt::test]
    async fn invalid_category_id_is_rejected() {
        let handler = FilterHandler::new(
            MockFilterCategoryRepository::new(),
            MockProjectRepository::new(),
            PublicCaches::new(Duration::from_secs(60)),
        );
        let err = handler.save("bad id!", input(&["PLA"])).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn delete_reports_all_options() {
        let mut filters = MockFilterCategoryRepository::new();
        filters.expect_delete_category().returning(|_| Ok(category(&["pla", "petg"])));
        let mut projects = MockProjectRepository::new();
        projects.expect_count_referencing_filters().returning(|_| Ok(5));

        let handler = FilterHandler::new(filters, projects, PublicCaches::new(Duration::from_secs(60)));
        let change = handler.delete("material").await.unwrap();

        assert!(change.category.is_none());
        assert_eq!(change.removed_option_ids.len(), 2);
        assert_eq!(change.orphaned_projects, 5);
    }
}
