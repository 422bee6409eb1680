use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::filter_category::FilterCategoryInput,
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_filters(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.filter_handler.list().await?;
    Ok(HttpResponse::Ok().json(categories.as_ref()))
}

#[instrument(skip(_session, state, data))]
pub async fn save_filter(
    _session: AdminSession,
    category_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<FilterCategoryInput>,
) -> Result<impl Responder, AppError> {
    let change = state.filter_handler.save(&category_id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(change))
}

#[instrument(skip(_session, state))]
pub async fn delete_filter(
    _session: AdminSession,
    category_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let change = state.filter_handler.delete(&category_id).await?;
    Ok(HttpResponse::Ok().json(change))
}
