use crate::features::attachments::handlers;
use crate::features::attachments::services::AttachmentService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(service: Arc<AttachmentService>, max_attachment_size: usize) -> Router {
    Router::new()
        .route(
            "/api/Attachments/request/{requestId}",
            get(handlers::list_attachments)
                .post(handlers::upload_attachment)
                .layer(DefaultBodyLimit::max(max_attachment_size + MULTIPART_OVERHEAD)),
        )
        .route("/api/Attachments/{id}", delete(handlers::delete_attachment))
        .route(
            "/api/Attachments/{id}/download",
            get(handlers::download_attachment),
        )
        .with_state(service)
}
