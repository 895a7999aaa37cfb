use crate::features::notes::handlers;
use crate::features::notes::services::NoteService;
use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<NoteService>) -> Router {
    Router::new()
        .route(
            "/api/Notes/request/{requestId}",
            get(handlers::list_notes).post(handlers::add_note),
        )
        .route(
            "/api/Notes/request/{requestId}/mine",
            put(handlers::upsert_my_note),
        )
        .route(
            "/api/Notes/{id}",
            put(handlers::update_note).delete(handlers::delete_note),
        )
        .with_state(service)
}
