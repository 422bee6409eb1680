use actix_web::web;

use crate::handlers::{home::home, system::health_check, uploads::download_file};

mod public;
mod auth;
mod admin;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);
    cfg.service(web::resource("/files/{file_path:.*}").route(web::get().to(download_file)));

    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(admin::config_routes)
            .configure(public::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
