use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::features::attachments::{dtos as attachments_dtos, handlers as attachments_handlers};
use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::company_settings::{
    dtos as company_settings_dtos, handlers as company_settings_handlers,
};
use crate::features::export::handlers as export_handlers;
use crate::features::notes::{dtos as notes_dtos, handlers as notes_handlers};
use crate::features::requests::{
    dtos as requests_dtos, handlers as requests_handlers, models as requests_models,
    services::scope::RequestSortBy,
};
use crate::features::scoring::{dtos as scoring_dtos, handlers as scoring_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::change_password,
        auth::handlers::get_me,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::delete_user,
        // Requests
        requests_handlers::list_requests,
        requests_handlers::create_request,
        requests_handlers::get_request,
        requests_handlers::update_request,
        requests_handlers::change_request_status,
        // Notes
        notes_handlers::list_notes,
        notes_handlers::add_note,
        notes_handlers::upsert_my_note,
        notes_handlers::update_note,
        notes_handlers::delete_note,
        // Attachments
        attachments_handlers::upload_attachment,
        attachments_handlers::list_attachments,
        attachments_handlers::download_attachment,
        attachments_handlers::delete_attachment,
        // Company settings
        company_settings_handlers::get_company_settings,
        company_settings_handlers::update_company_settings,
        // AI scoring
        scoring_handlers::generate_missing_scores,
        // Export
        export_handlers::export_requests,
        export_handlers::export_requests_legacy,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::SessionUserDto,
            auth_dtos::ChangePasswordDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            // Users
            users_models::Role,
            users_dtos::UserResponseDto,
            users_dtos::CreateUserDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Requests
            requests_models::RequestStatus,
            RequestSortBy,
            requests_dtos::SortDirection,
            requests_dtos::CreateRequestDto,
            requests_dtos::UpdateRequestDto,
            requests_dtos::ChangeStatusDto,
            requests_dtos::PersonDto,
            requests_dtos::RequestResponseDto,
            requests_dtos::RequestDetailDto,
            ApiResponse<requests_dtos::RequestResponseDto>,
            ApiResponse<requests_dtos::RequestDetailDto>,
            ApiResponse<Vec<requests_dtos::RequestResponseDto>>,
            // Notes
            notes_dtos::NoteBodyDto,
            notes_dtos::NoteResponseDto,
            ApiResponse<notes_dtos::NoteResponseDto>,
            ApiResponse<Vec<notes_dtos::NoteResponseDto>>,
            // Attachments
            attachments_dtos::UploadAttachmentDto,
            attachments_dtos::AttachmentResponseDto,
            ApiResponse<attachments_dtos::AttachmentResponseDto>,
            ApiResponse<Vec<attachments_dtos::AttachmentResponseDto>>,
            // Company settings
            company_settings_dtos::CompanySettingsDto,
            company_settings_dtos::UpdateCompanySettingsDto,
            ApiResponse<company_settings_dtos::CompanySettingsDto>,
            // AI scoring
            scoring_dtos::ScoringSummaryDto,
            ApiResponse<scoring_dtos::ScoringSummaryDto>,
        )
    ),
    tags(
        (name = "auth", description = "Session login, logout and password change"),
        (name = "users", description = "User administration (admin only)"),
        (name = "requests", description = "Purchase requests and their approval workflow"),
        (name = "notes", description = "Notes on purchase requests"),
        (name = "attachments", description = "Files attached to purchase requests"),
        (name = "company-settings", description = "Company description used as scoring context"),
        (name = "ai", description = "AI usefulness scoring"),
        (name = "export", description = "CSV/ZIP export of purchase requests"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Purchase Desk API",
        version = "0.1.0",
        description = "API documentation for Purchase Desk",
    )
)]
pub struct ApiDoc;

/// Adds the session cookie and Bearer JWT security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("access_token"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/auth/login",
            "/api/Requests/{id}/status",
            "/api/Notes/request/{requestId}/mine",
            "/api/Attachments/{id}/download",
            "/api/AI/generate-missing-scores",
            "/api/Perla/export",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }

    #[test]
    fn test_both_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.expect("components").security_schemes;

        assert!(schemes.contains_key("cookie_auth"));
        assert!(schemes.contains_key("bearer_auth"));
    }
}
