use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::scoring::handlers;
use crate::features::scoring::services::ScoringService;

pub fn routes(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route(
            "/api/AI/generate-missing-scores",
            post(handlers::generate_missing_scores),
        )
        .with_state(service)
}
