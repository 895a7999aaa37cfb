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
use crate::features::auth::guards::{RequireApprover, RequireEmployee};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::requests::dtos::{
    ChangeStatusDto, CreateRequestDto, RequestDetailDto, RequestQueryParams, RequestResponseDto,
    UpdateRequestDto,
};
use crate::features::requests::services::RequestService;
use crate::shared::types::{ApiResponse, Meta};

/// List requests visible to the caller
///
/// Admins see every request, managers the ones assigned to them, employees their own.
#[utoipa::path(
    get,
    path = "/api/Requests",
    params(RequestQueryParams),
    responses(
        (status = 200, description = "Page of requests", body = ApiResponse<Vec<RequestResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "requests",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_requests(
    user: AuthenticatedUser,
    State(service): State<Arc<RequestService>>,
    Query(params): Query<RequestQueryParams>,
) -> Result<Json<ApiResponse<Vec<RequestResponseDto>>>> {
    let (items, total) = service.list(&user, &params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Create a purchase request (employees only)
#[utoipa::path(
    post,
    path = "/api/Requests",
    request_body = CreateRequestDto,
    responses(
        (status = 201, description = "Request created and assigned", body = ApiResponse<RequestResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Employee access required"),
        (status = 409, description = "No approver available")
    ),
    tag = "requests",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn create_request(
    RequireEmployee(user): RequireEmployee,
    State(service): State<Arc<RequestService>>,
    AppJson(dto): AppJson<CreateRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<RequestResponseDto>>)> {
    dto.validate()?;

    let request = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(request), None, None)),
    ))
}

/// Get a request with its notes and attachments
#[utoipa::path(
    get,
    path = "/api/Requests/{id}",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request detail", body = ApiResponse<RequestDetailDto>),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Request not found")
    ),
    tag = "requests",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_request(
    user: AuthenticatedUser,
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RequestDetailDto>>> {
    let detail = service.get_detail(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Edit a waiting request (owner only); absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/api/Requests/{id}",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateRequestDto,
    responses(
        (status = 200, description = "Request updated", body = ApiResponse<RequestResponseDto>),
        (status = 400, description = "Validation error or request no longer waiting"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Request not found")
    ),
    tag = "requests",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_request(
    user: AuthenticatedUser,
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateRequestDto>,
) -> Result<Json<ApiResponse<RequestResponseDto>>> {
    dto.validate()?;

    let request = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}

/// Approve, reject or mark a waiting request as purchased
#[utoipa::path(
    patch,
    path = "/api/Requests/{id}/status",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = ChangeStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<RequestResponseDto>),
        (status = 400, description = "Invalid status or request no longer waiting"),
        (status = 403, description = "Not the assigned manager or an admin"),
        (status = 404, description = "Request not found")
    ),
    tag = "requests",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn change_request_status(
    RequireApprover(user): RequireApprover,
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ChangeStatusDto>,
) -> Result<Json<ApiResponse<RequestResponseDto>>> {
    dto.validate()?;

    let request = service.change_status(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}
