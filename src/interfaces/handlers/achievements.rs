use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{achievement::AchievementInput, project::ToggleRequest},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_achievements(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let mut achievements = state.achievement_handler.list_public().await?;
    state.storage.sign_all(&mut achievements);
    Ok(HttpResponse::Ok().json(achievements))
}

#[instrument(skip(state))]
pub async fn get_achievement(
    achievement_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let mut achievement = state.achievement_handler.get_public(&achievement_id).await?;
    state.storage.sign_assets(&mut achievement);
    Ok(HttpResponse::Ok().json(achievement))
}

#[instrument(skip(_session, state))]
pub async fn admin_list_achievements(
    _session: AdminSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let mut achievements = state.achievement_handler.list_admin().await?;
    state.storage.sign_all(&mut achievements);
    Ok(HttpResponse::Ok().json(achievements))
}

#[instrument(skip(_session, state, data))]
pub async fn save_achievement(
    _session: AdminSession,
    achievement_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<AchievementInput>,
) -> Result<impl Responder, AppError> {
    let mut input = data.into_inner();
    state.storage.unsign_assets(&mut input);

    let mut achievement = state.achievement_handler.save(&achievement_id, input).await?;
    state.storage.sign_assets(&mut achievement);
    Ok(HttpResponse::Ok().json(achievement))
}

#[instrument(skip(_session, state))]
pub async fn delete_achievement(
    _session: AdminSession,
    achievement_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.achievement_handler.delete(&achievement_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_session, state, data))]
pub async fn set_achievement_published(
    _session: AdminSession,
    achievement_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ToggleRequest>,
) -> Result<impl Responder, AppError> {
    let mut achievement = state
        .achievement_handler
        .set_published(&achievement_id, data.value)
        .await?;
    state.storage.sign_assets(&mut achievement);
    Ok(HttpResponse::Ok().json(achievement))
}
