use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

/// User administration routes (admin only, auth applied by caller)
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/api/Users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/Users/{id}", delete(handlers::delete_user))
        .with_state(service)
}
