use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::{
        content::Language,
        project::{ProjectInput, ReorderRequest, ToggleRequest},
    },
    errors::AppError,
    listing::{filter::parse_selection, SortMode},
    use_cases::extractors::AdminSession,
    AppState,
};

/// `?filters=a,b&sort=date-newest&lang=cs`. Unknown keys such as `_t` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub filters: Option<String>,
    pub sort: Option<String>,
    pub lang: Option<String>,
}

impl ListingQuery {
    /// A blank `sort=` falls back to the stored default like an absent one.
    fn sort_mode(&self) -> Result<Option<SortMode>, AppError> {
        self.sort
            .as_deref()
            .filter(|sort| !sort.trim().is_empty())
            .map(str::parse)
            .transpose()
    }

    fn language(&self) -> Result<Language, AppError> {
        Ok(self.lang.as_deref().map(str::parse).transpose()?.unwrap_or_default())
    }
}

#[instrument(skip(state, query))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> Result<impl Responder, AppError> {
    let selection = parse_selection(query.filters.as_deref());
    let mut projects = state
        .project_handler
        .list_public(&selection, query.sort_mode()?, query.language()?)
        .await?;

    state.storage.sign_all(&mut projects);
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn featured_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let mut projects = state.project_handler.featured().await?;
    state.storage.sign_all(&mut projects);
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let mut detail = state.project_handler.get_public(&project_id).await?;
    state.storage.sign_assets(&mut detail.project);
    Ok(HttpResponse::Ok().json(detail))
}

#[instrument(skip(_session, state, query))]
pub async fn admin_list_projects(
    _session: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> Result<impl Responder, AppError> {
    let selection = parse_selection(query.filters.as_deref());
    let mut projects = state.project_handler.list_admin(&selection, query.sort_mode()?).await?;

    state.storage.sign_all(&mut projects);
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_session, state, data))]
pub async fn save_project(
    _session: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    let mut input = data.into_inner();
    state.storage.unsign_assets(&mut input);

    let (mut project, created) = state.project_handler.save(&project_id, input).await?;
    state.storage.sign_assets(&mut project);

    if created {
        Ok(HttpResponse::Created().json(project))
    } else {
        Ok(HttpResponse::Ok().json(project))
    }
}

#[instrument(skip(_session, state))]
pub async fn delete_project(
    _session: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete(&project_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_session, state, data))]
pub async fn set_project_published(
    _session: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ToggleRequest>,
) -> Result<impl Responder, AppError> {
    let mut project = state.project_handler.set_published(&project_id, data.value).await?;
    state.storage.sign_assets(&mut project);
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_session, state, data))]
pub async fn set_project_featured(
    _session: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ToggleRequest>,
) -> Result<impl Responder, AppError> {
    let mut project = state.project_handler.set_featured(&project_id, data.value).await?;
    state.storage.sign_assets(&mut project);
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_session, state, data))]
pub async fn reorder_projects(
    _session: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<ReorderRequest>,
) -> Result<impl Responder, AppError> {
    let outcome = state.project_handler.reorder(&data.ids).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(sort: Option<&str>, lang: Option<&str>) -> ListingQuery {
        ListingQuery {
            filters: None,
            sort: sort.map(str::to_string),
            lang: lang.map(str::to_string),
        }
    }

    #[test]
    fn blank_sort_uses_stored_default() {
        assert_eq!(query(Some(""), None).sort_mode().unwrap(), None);
        assert_eq!(query(Some("  "), None).sort_mode().unwrap(), None);
        assert_eq!(query(None, None).sort_mode().unwrap(), None);
        assert_eq!(query(Some("none"), None).sort_mode().unwrap(), Some(SortMode::None));
        assert_eq!(query(Some("date-newest"), None).sort_mode().unwrap(), Some(SortMode::DateNewest));
    }

    #[test]
    fn unknown_sort_is_rejected() {
        assert!(matches!(query(Some("random"), None).sort_mode(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(query(None, None).language().unwrap(), Language::En);
        assert_eq!(query(None, Some("cs")).language().unwrap(), Language::Cs);
        assert!(query(None, Some("de")).language().is_err());
    }

    #[test]
    fn cache_bust_parameter_is_ignored() {
        let parsed = web::Query::<ListingQuery>::from_query("filters=pla,fdm&_t=1718000000000").unwrap();
        assert_eq!(parsed.filters.as_deref(), Some("pla,fdm"));
    }
}
