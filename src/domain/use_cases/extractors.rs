use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::SessionClaims, errors::AuthError};

/// Claims of the admin session the middleware accepted for this request.
/// Returns 401 "session expired" when there is none.
/// Usage: Add `session: AdminSession` as a parameter to an admin handler.
#[derive(Debug)]
pub struct AdminSession(pub SessionClaims);

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<SessionClaims>() {
            Some(claims) => ready(Ok(AdminSession(claims.clone()))),
            None => ready(Err(AuthError::SessionExpired.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test::TestRequest, FromRequest, ResponseError};

    #[actix_rt::test]
    async fn missing_session_is_expired() {
        let req = TestRequest::default().to_http_request();
        let err = AdminSession::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), AuthError::SessionExpired.status_code());
    }

    #[actix_rt::test]
    async fn claims_from_extensions() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(SessionClaims {
            sub: "admin".into(),
            sid: "sid-1".into(),
            iat: 0,
            iat_ms: 0,
            exp: i64::MAX,
        });

        let AdminSession(claims) = AdminSession::extract(&req).await.unwrap();
        assert_eq!(claims.sid, "sid-1");
    }
}
