use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "CAD & 3D printing portfolio API",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "languages": ["en", "cs"],
        "api": "/api/v1"
    }))
}
