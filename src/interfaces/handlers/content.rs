use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::{
        content::{Language, SiteContent},
        site_settings::SiteSettings,
    },
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

#[instrument(skip(state, query))]
pub async fn get_content(
    state: web::Data<AppState>,
    query: web::Query<LanguageQuery>,
) -> Result<impl Responder, AppError> {
    let lang: Language = query.lang.as_deref().map(str::parse).transpose()?.unwrap_or_default();

    let mut resolved = state.content_handler.resolved(lang).await?;
    state.storage.sign_assets(&mut resolved);
    Ok(HttpResponse::Ok().json(resolved))
}

#[instrument(skip(_session, state))]
pub async fn admin_get_content(
    _session: AdminSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let mut content = state.content_handler.raw().await?;
    state.storage.sign_assets(&mut content);
    Ok(HttpResponse::Ok().json(content))
}

#[instrument(skip(_session, state, data))]
pub async fn replace_content(
    _session: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<SiteContent>,
) -> Result<impl Responder, AppError> {
    let mut content = data.into_inner();
    state.storage.unsign_assets(&mut content);

    let mut stored = state.content_handler.replace(content).await?;
    state.storage.sign_assets(&mut stored);
    Ok(HttpResponse::Ok().json(stored))
}

#[instrument(skip(_session, state))]
pub async fn get_settings(
    _session: AdminSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let settings = state.content_handler.settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[instrument(skip(_session, state, data))]
pub async fn update_settings(
    _session: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<SiteSettings>,
) -> Result<impl Responder, AppError> {
    let settings = state.content_handler.update_settings(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}
