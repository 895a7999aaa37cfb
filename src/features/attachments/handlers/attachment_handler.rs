use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dtos::{AttachmentResponseDto, UploadAttachmentDto};
use crate::features::attachments::services::{AttachmentService, UploadedFile};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta};

/// Upload an attachment to a request (owning employee only)
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/Attachments/request/{requestId}",
    params(("requestId" = Uuid, Path, description = "Request ID")),
    request_body(
        content = UploadAttachmentDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Attachment stored", body = ApiResponse<AttachmentResponseDto>),
        (status = 400, description = "Missing, empty or oversized file"),
        (status = 403, description = "Only the request owner can attach files"),
        (status = 404, description = "Request not found")
    ),
    tag = "attachments",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn upload_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(request_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AttachmentResponseDto>>)> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field.file_name().unwrap_or("unnamed").to_string();

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let file = upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let attachment = service.upload(&user, request_id, file).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(attachment), None, None)),
    ))
}

/// List the attachments of a request
#[utoipa::path(
    get,
    path = "/api/Attachments/request/{requestId}",
    params(("requestId" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Attachments of the request", body = ApiResponse<Vec<AttachmentResponseDto>>),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Request not found")
    ),
    tag = "attachments",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_attachments(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AttachmentResponseDto>>>> {
    let attachments = service.list(&user, request_id).await?;
    let total = attachments.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(attachments),
        None,
        Some(Meta { total }),
    )))
}

/// Download an attachment's raw bytes with its stored MIME type
#[utoipa::path(
    get,
    path = "/api/Attachments/{id}/download",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Attachment or file not found")
    ),
    tag = "attachments",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn download_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (attachment, data) = service.download(&user, id).await?;

    let content_type = HeaderValue::from_str(&attachment.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        attachment.storage_key
    ))
    .map_err(|e| AppError::Internal(format!("Invalid content disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Delete an attachment and its file
#[utoipa::path(
    delete,
    path = "/api/Attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "Attachment deleted"),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Attachment not found, or its file is missing (row kept)")
    ),
    tag = "attachments",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn delete_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Attachment deleted successfully".to_string()),
        None,
    )))
}
