use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::export::dtos::ExportQueryParams;
use crate::features::export::services::{build_archive, export_file_name};
use crate::features::requests::services::RequestService;

/// Export the requests visible to the caller as a ZIP of CSV files
///
/// The archive holds `requests.csv` and `stats.csv` (count, sum, mean).
#[utoipa::path(
    get,
    path = "/api/export",
    params(ExportQueryParams),
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "export",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn export_requests(
    user: AuthenticatedUser,
    State(service): State<Arc<RequestService>>,
    Query(params): Query<ExportQueryParams>,
) -> Result<Response> {
    let requests = service
        .list_all(&user, &params.filter(), params.sort())
        .await?;
    let archive = build_archive(&requests)?;

    tracing::info!("{} exported {} requests", user.id, requests.len());

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now())
    ))
    .map_err(|e| AppError::Internal(format!("Invalid content disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

/// Same export under the legacy path
#[utoipa::path(
    get,
    path = "/api/Perla/export",
    params(ExportQueryParams),
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "export",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn export_requests_legacy(
    user: AuthenticatedUser,
    state: State<Arc<RequestService>>,
    query: Query<ExportQueryParams>,
) -> Result<Response> {
    export_requests(user, state, query).await
}
