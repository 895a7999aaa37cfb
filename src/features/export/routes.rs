use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::export::handlers;
use crate::features::requests::services::RequestService;

pub fn routes(service: Arc<RequestService>) -> Router {
    Router::new()
        .route("/api/export", get(handlers::export_requests))
        .route("/api/Perla/export", get(handlers::export_requests_legacy))
        .with_state(service)
}
