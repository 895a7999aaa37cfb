use crate::features::requests::handlers;
use crate::features::requests::services::RequestService;
use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<RequestService>) -> Router {
    Router::new()
        .route(
            "/api/Requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route(
            "/api/Requests/{id}",
            get(handlers::get_request).put(handlers::update_request),
        )
        .route(
            "/api/Requests/{id}/status",
            patch(handlers::change_request_status),
        )
        .with_state(service)
}
