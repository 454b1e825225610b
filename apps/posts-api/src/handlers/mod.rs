//! HTTP handlers and route configuration.

mod actuator;
mod posts;

use actix_web::{HttpRequest, error, web};

use crate::middleware::auth::BearerAuth;
use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(
            web::scope("/api/posts")
                .wrap(BearerAuth)
                .route("", web::get().to(posts::list_posts))
                .route("", web::post().to(posts::create_post))
                .route("/{id}", web::get().to(posts::get_post))
                .route("/{id}", web::put().to(posts::update_post))
                .route("/{id}", web::delete().to(posts::delete_post)),
        )
        // Public routes
        .service(
            web::scope("/actuator")
                .route("/health", web::get().to(actuator::health))
                .route("/info", web::get().to(actuator::info))
                .route("/metrics", web::get().to(actuator::metrics)),
        );
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}
