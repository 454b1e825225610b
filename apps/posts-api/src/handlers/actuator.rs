//! Health, info and metrics endpoints.

use actix_web::{HttpResponse, web};
use posts_shared::StatusResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /actuator/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse::ok())
}

/// GET /actuator/info
pub async fn info() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse::ok())
}

/// GET /actuator/metrics - Prometheus text exposition.
pub async fn metrics(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
