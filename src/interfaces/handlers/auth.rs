use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::admin::{
        ChangePasswordRequest, ConfirmPasswordReset, LoginRequest, PasswordResetRequest, ResetTokenRequest,
    },
    errors::AuthError,
    use_cases::extractors::AdminSession,
    utils::get_client_ip::get_client_ip,
    AppState,
};

#[post("/login")]
#[instrument(skip(req, state, data))]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<LoginRequest>,
) -> Result<impl Responder, AuthError> {
    let client_ip = get_client_ip(&req, state.trust_forwarded_for);
    let response = state.auth_handler.login(data.into_inner(), &client_ip).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/logout")]
#[instrument(skip(session, state))]
pub async fn logout(session: AdminSession, state: web::Data<AppState>) -> Result<impl Responder, AuthError> {
    state.auth_handler.logout(&session.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/password-reset/request")]
#[instrument(skip(req, state, data))]
pub async fn request_password_reset(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<PasswordResetRequest>,
) -> Result<impl Responder, AuthError> {
    let client_ip = get_client_ip(&req, state.trust_forwarded_for);
    let response = state.auth_handler.request_reset(data.into_inner(), &client_ip)?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/password-reset/verify")]
#[instrument(skip(state, data))]
pub async fn verify_password_reset(
    state: web::Data<AppState>,
    data: web::Json<ResetTokenRequest>,
) -> Result<impl Responder, AuthError> {
    let status = state.auth_handler.verify_reset(&data)?;
    Ok(HttpResponse::Ok().json(status))
}

#[post("/password-reset/confirm")]
#[instrument(skip(state, data))]
pub async fn confirm_password_reset(
    state: web::Data<AppState>,
    data: web::Json<ConfirmPasswordReset>,
) -> Result<impl Responder, AuthError> {
    state.auth_handler.confirm_reset(data.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/password")]
#[instrument(skip(_session, state, data))]
pub async fn change_password(
    _session: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AuthError> {
    let response = state.auth_handler.change_password(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
