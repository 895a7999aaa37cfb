use crate::features::company_settings::handlers;
use crate::features::company_settings::services::CompanySettingsService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<CompanySettingsService>) -> Router {
    Router::new()
        .route(
            "/api/CompanySettings",
            get(handlers::get_company_settings).put(handlers::update_company_settings),
        )
        .with_state(service)
}
