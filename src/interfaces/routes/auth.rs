use actix_web::web;

use crate::handlers::auth;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::request_password_reset)
            .service(auth::verify_password_reset)
            .service(auth::confirm_password_reset)
    );
}
