use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::attachments::models::Attachment;

/// Multipart form for uploading an attachment
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAttachmentDto {
    /// The file to attach (at most 5 MiB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for an attachment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachmentResponseDto {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    /// Relative URL streaming the file
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Attachment> for AttachmentResponseDto {
    fn from(a: Attachment) -> Self {
        Self {
            download_url: format!("/api/Attachments/{}/download", a.id),
            id: a.id,
            request_id: a.request_id,
            file_name: a.storage_key,
            mime_type: a.mime_type,
            file_size: a.file_size,
            created_at: a.created_at,
        }
    }
}
