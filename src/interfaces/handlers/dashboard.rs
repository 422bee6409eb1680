use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::{dashboard::dashboard_summary, extractors::AdminSession}, AppState};

#[instrument(skip(_session, state))]
pub async fn admin_dashboard(
    _session: AdminSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let repos = &state.repos;
    let summary = dashboard_summary(
        &repos.project_repo,
        &repos.filter_repo,
        &repos.achievement_repo,
        &repos.testimonial_repo,
    )
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}
