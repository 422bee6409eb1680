use actix_web::web;

use crate::handlers::{
    achievements, auth, content, dashboard, filters, projects, system::admin_health_check, testimonials, uploads,
};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_health_check)
            .service(auth::change_password)
            .service(web::resource("/dashboard").route(web::get().to(dashboard::admin_dashboard)))
            .service(web::resource("/uploads").route(web::post().to(uploads::upload_file)))
            .service(
                web::resource("/content")
                    .route(web::get().to(content::admin_get_content))
                    .route(web::put().to(content::replace_content))
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(content::get_settings))
                    .route(web::put().to(content::update_settings))
            )
            .configure(project_routes)
            .configure(filter_routes)
            .configure(achievement_routes)
            .configure(testimonial_routes)
    );
}

fn project_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .service(web::resource("").route(web::get().to(projects::admin_list_projects)))
            .service(web::resource("/reorder").route(web::post().to(projects::reorder_projects)))
            .service(
                web::resource("/{project_id}")
                    .route(web::put().to(projects::save_project))
                    .route(web::delete().to(projects::delete_project))
            )
            .service(web::resource("/{project_id}/published").route(web::post().to(projects::set_project_published)))
            .service(web::resource("/{project_id}/featured").route(web::post().to(projects::set_project_featured)))
    );
}

fn filter_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/filters/{category_id}")
            .route(web::put().to(filters::save_filter))
            .route(web::delete().to(filters::delete_filter))
    );
}

fn achievement_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/achievements")
            .service(web::resource("").route(web::get().to(achievements::admin_list_achievements)))
            .service(
                web::resource("/{achievement_id}")
                    .route(web::put().to(achievements::save_achievement))
                    .route(web::delete().to(achievements::delete_achievement))
            )
            .service(
                web::resource("/{achievement_id}/published")
                    .route(web::post().to(achievements::set_achievement_published))
            )
    );
}

fn testimonial_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/testimonials")
            .service(web::resource("").route(web::get().to(testimonials::admin_list_testimonials)))
            .service(
                web::resource("/{testimonial_id}")
                    .route(web::put().to(testimonials::save_testimonial))
                    .route(web::delete().to(testimonials::delete_testimonial))
            )
            .service(
                web::resource("/{testimonial_id}/published")
                    .route(web::post().to(testimonials::set_testimonial_published))
            )
            .service(
                web::resource("/{testimonial_id}/featured")
                    .route(web::post().to(testimonials::set_testimonial_featured))
            )
    );
}
