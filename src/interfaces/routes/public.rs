use actix_web::web;

use crate::handlers::{achievements, content, filters, projects, testimonials};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .service(web::resource("").route(web::get().to(projects::list_projects)))
            .service(web::resource("/featured").route(web::get().to(projects::featured_projects)))
            .service(web::resource("/{project_id}").route(web::get().to(projects::get_project)))
    )
    .service(web::resource("/filters").route(web::get().to(filters::list_filters)))
    .service(
        web::scope("/achievements")
            .service(web::resource("").route(web::get().to(achievements::list_achievements)))
            .service(web::resource("/{achievement_id}").route(web::get().to(achievements::get_achievement)))
    )
    .service(
        web::scope("/testimonials")
            .service(web::resource("").route(web::get().to(testimonials::list_testimonials)))
            .service(web::resource("/featured").route(web::get().to(testimonials::featured_testimonials)))
    )
    .service(web::resource("/content").route(web::get().to(content::get_content)));
}
