use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a file attached to a purchase request
#[derive(Debug, Clone, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Key of the file in the blob store: random id plus original extension
    pub storage_key: String,
    /// MIME type as sent by the uploader
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}
