use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{constants::ADMIN_TOKEN_HEADER, errors::AuthError, AppState};

const API_PREFIX: &str = "/api/";
const ADMIN_PREFIX: &str = "/api/v1/admin";
const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Guards `/api`: every request carries the anon key as a bearer token, and
/// admin routes additionally carry a live session in `X-Admin-Token`.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path().to_string();

            if req.method() == actix_web::http::Method::OPTIONS || !path.starts_with(API_PREFIX) {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in middleware");
                return Ok(error_response(req, AuthError::Account("server misconfigured".into())));
            };

            if let Some(expected) = state.anon_key.as_deref() {
                let presented = extract_bearer(&req);
                if presented.as_deref() != Some(expected) {
                    tracing::warn!(%path, "request without a valid anon key");
                    return Ok(error_response(req, AuthError::InvalidApiKey));
                }
            }

            if requires_session(&path) {
                let Some(token) = extract_admin_token(&req) else {
                    return Ok(error_response(req, AuthError::SessionExpired));
                };

                match state.auth_handler.authenticate(&token).await {
                    Ok(claims) => {
                        req.extensions_mut().insert(claims);
                    }
                    Err(e) => {
                        tracing::info!(%path, "admin request rejected: {}", e);
                        return Ok(error_response(req, e));
                    }
                }
            }

            service.call(req).await
        })
    }
}

fn requires_session(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with(&format!("{}/", ADMIN_PREFIX)) || path == LOGOUT_PATH
}

fn extract_bearer(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn extract_admin_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn error_response(req: ServiceRequest, err: AuthError) -> ServiceResponse<BoxBody> {
    req.into_response(err.error_response())
}
