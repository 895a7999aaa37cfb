use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::users::dtos::{CreateUserDto, UserQueryParams, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

/// List active users (admin only)
#[utoipa::path(
    get,
    path = "/api/Users",
    params(UserQueryParams),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "users",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Query(params): Query<UserQueryParams>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (items, total) = service.list(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/Users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()?;

    let user = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user.into()), None, None)),
    ))
}

/// Soft-delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/Users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.soft_delete(id, admin.id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted successfully".to_string()),
        None,
    )))
}
