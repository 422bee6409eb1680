use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{project::ToggleRequest, testimonial::TestimonialInput},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_testimonials(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let testimonials = state.testimonial_handler.list_public().await?;
    Ok(HttpResponse::Ok().json(testimonials))
}

#[instrument(skip(state))]
pub async fn featured_testimonials(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let testimonials = state.testimonial_handler.featured().await?;
    Ok(HttpResponse::Ok().json(testimonials))
}

#[instrument(skip(_session, state))]
pub async fn admin_list_testimonials(
    _session: AdminSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let testimonials = state.testimonial_handler.list_admin().await?;
    Ok(HttpResponse::Ok().json(testimonials))
}

#[instrument(skip(_session, state, data))]
pub async fn save_testimonial(
    _session: AdminSession,
    testimonial_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<TestimonialInput>,
) -> Result<impl Responder, AppError> {
    let testimonial = state
        .testimonial_handler
        .save(&testimonial_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(testimonial))
}

#[instrument(skip(_session, state))]
pub async fn delete_testimonial(
    _session: AdminSession,
    testimonial_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.testimonial_handler.delete(&testimonial_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_session, state, data))]
pub async fn set_testimonial_published(
    _session: AdminSession,
    testimonial_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ToggleRequest>,
) -> Result<impl Responder, AppError> {
    let testimonial = state
        .testimonial_handler
        .set_published(&testimonial_id, data.value)
        .await?;
    Ok(HttpResponse::Ok().json(testimonial))
}

#[instrument(skip(_session, state, data))]
pub async fn set_testimonial_featured(
    _session: AdminSession,
    testimonial_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ToggleRequest>,
) -> Result<impl Responder, AppError> {
    let testimonial = state
        .testimonial_handler
        .set_featured(&testimonial_id, data.value)
        .await?;
    Ok(HttpResponse::Ok().json(testimonial))
}
