use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::scoring::dtos::ScoringSummaryDto;
use crate::features::scoring::services::ScoringService;
use crate::shared::types::ApiResponse;

/// Score every request that has no AI score yet
#[utoipa::path(
    post,
    path = "/api/AI/generate-missing-scores",
    tag = "ai",
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Backfill finished", body = ApiResponse<ScoringSummaryDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn generate_missing_scores(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ScoringService>>,
) -> Result<Json<ApiResponse<ScoringSummaryDto>>> {
    tracing::info!("Scoring backfill started by {}", user.id);

    let summary = service.generate_missing_scores().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}
