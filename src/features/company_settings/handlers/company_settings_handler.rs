use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::company_settings::dtos::{CompanySettingsDto, UpdateCompanySettingsDto};
use crate::features::company_settings::services::CompanySettingsService;
use crate::shared::types::ApiResponse;

/// Get the company settings
#[utoipa::path(
    get,
    path = "/api/CompanySettings",
    responses(
        (status = 200, description = "Company settings", body = ApiResponse<CompanySettingsDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "company-settings",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_company_settings(
    _user: AuthenticatedUser,
    State(service): State<Arc<CompanySettingsService>>,
) -> Result<Json<ApiResponse<CompanySettingsDto>>> {
    let settings = service.get().await?;
    Ok(Json(ApiResponse::success(Some(settings.into()), None, None)))
}

/// Replace the company description (admin only)
#[utoipa::path(
    put,
    path = "/api/CompanySettings",
    request_body = UpdateCompanySettingsDto,
    responses(
        (status = 200, description = "Company settings updated", body = ApiResponse<CompanySettingsDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "company-settings",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_company_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CompanySettingsService>>,
    AppJson(dto): AppJson<UpdateCompanySettingsDto>,
) -> Result<Json<ApiResponse<CompanySettingsDto>>> {
    dto.validate()?;

    let settings = service.update(dto).await?;
    Ok(Json(ApiResponse::success(Some(settings.into()), None, None)))
}
