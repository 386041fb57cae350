pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod upstream;

use actix_web::web;

/// Registers the gateway endpoints at the root and again under `/api`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("", web::get().to(handlers::root))
            .configure(endpoints),
    )
    .configure(endpoints);
}

fn endpoints(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/predict", web::post().to(handlers::predict))
        .route("/", web::get().to(handlers::root));
}
