use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::notes::models::NoteView;

/// Request DTO for writing a note (create, edit and upsert)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NoteBodyDto {
    #[validate(length(min = 1, max = 4000, message = "Note must be 1-4000 characters"))]
    pub body: String,
}

/// Response DTO for a note
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoteResponseDto {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<NoteView> for NoteResponseDto {
    fn from(v: NoteView) -> Self {
        Self {
            id: v.note.id,
            request_id: v.note.request_id,
            author_id: v.note.author_id,
            author_name: v.author_name,
            body: v.note.body,
            created_at: v.note.created_at,
            updated_at: v.note.updated_at,
        }
    }
}
