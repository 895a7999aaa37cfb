use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notes::dtos::{NoteBodyDto, NoteResponseDto};
use crate::features::notes::models::MyNoteWrite;
use crate::features::notes::services::NoteService;
use crate::shared::types::{ApiResponse, Meta};

/// List the notes of a request (oldest first)
#[utoipa::path(
    get,
    path = "/api/Notes/request/{requestId}",
    params(("requestId" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Notes of the request", body = ApiResponse<Vec<NoteResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Request not found")
    ),
    tag = "notes",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_notes(
    user: AuthenticatedUser,
    State(service): State<Arc<NoteService>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<NoteResponseDto>>>> {
    let notes = service.list(&user, request_id).await?;
    let total = notes.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(notes),
        None,
        Some(Meta { total }),
    )))
}

/// Add a note to a request
#[utoipa::path(
    post,
    path = "/api/Notes/request/{requestId}",
    params(("requestId" = Uuid, Path, description = "Request ID")),
    request_body = NoteBodyDto,
    responses(
        (status = 201, description = "Note added", body = ApiResponse<NoteResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Request not found")
    ),
    tag = "notes",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn add_note(
    user: AuthenticatedUser,
    State(service): State<Arc<NoteService>>,
    Path(request_id): Path<Uuid>,
    AppJson(dto): AppJson<NoteBodyDto>,
) -> Result<(StatusCode, Json<ApiResponse<NoteResponseDto>>)> {
    dto.validate()?;

    let note = service.add(&user, request_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(note), None, None)),
    ))
}

/// Set the caller's own note on a request (updates their latest note or creates one)
#[utoipa::path(
    put,
    path = "/api/Notes/request/{requestId}/mine",
    params(("requestId" = Uuid, Path, description = "Request ID")),
    request_body = NoteBodyDto,
    responses(
        (status = 200, description = "Existing note updated", body = ApiResponse<NoteResponseDto>),
        (status = 201, description = "Note created", body = ApiResponse<NoteResponseDto>),
        (status = 403, description = "Not a participant of the request"),
        (status = 404, description = "Request not found")
    ),
    tag = "notes",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn upsert_my_note(
    user: AuthenticatedUser,
    State(service): State<Arc<NoteService>>,
    Path(request_id): Path<Uuid>,
    AppJson(dto): AppJson<NoteBodyDto>,
) -> Result<(StatusCode, Json<ApiResponse<NoteResponseDto>>)> {
    dto.validate()?;

    let (note, write) = service.upsert_mine(&user, request_id, dto).await?;

    Ok((
        upsert_status(write),
        Json(ApiResponse::success(Some(note), None, None)),
    ))
}

fn upsert_status(write: MyNoteWrite) -> StatusCode {
    if write.creates() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// Edit a note (author only)
#[utoipa::path(
    put,
    path = "/api/Notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = NoteBodyDto,
    responses(
        (status = 200, description = "Note updated", body = ApiResponse<NoteResponseDto>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_note(
    user: AuthenticatedUser,
    State(service): State<Arc<NoteService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<NoteBodyDto>,
) -> Result<Json<ApiResponse<NoteResponseDto>>> {
    dto.validate()?;

    let note = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(note), None, None)))
}

/// Delete a note (author only)
#[utoipa::path(
    delete,
    path = "/api/Notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn delete_note(
    user: AuthenticatedUser,
    State(service): State<Arc<NoteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Note deleted successfully".to_string()),
        None,
    )))
}
