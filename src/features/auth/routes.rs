use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use crate::features::users::UserService;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no session required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .with_state(service)
}

/// Protected auth routes (require a valid session)
pub fn protected_routes(service: Arc<AuthService>, users: Arc<UserService>) -> Router {
    Router::new()
        .route("/auth/change-password", patch(handlers::change_password))
        .with_state(service)
        .merge(
            Router::new()
                .route("/auth/me", get(handlers::get_me))
                .with_state(users),
        )
}
