//! HTTP handlers and route configuration.

mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::json_error_handler;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::write))
                    .route("", web::get().to(posts::list))
                    .route("/{id}", web::get().to(posts::read))
                    .route("/{id}", web::delete().to(posts::remove))
                    .route("/{id}", web::patch().to(posts::update)),
            ),
    );
}
