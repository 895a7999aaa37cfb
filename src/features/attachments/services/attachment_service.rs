use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dtos::AttachmentResponseDto;
use crate::features::attachments::models::Attachment;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::ensure_owner;
use crate::features::requests::services::RequestService;
use crate::modules::storage::BlobStore;

const ATTACHMENT_COLUMNS: &str = "id, request_id, storage_key, mime_type, file_size, created_at";

/// A file received from a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Attachments of a request, oldest first
pub async fn list_for_request(pool: &PgPool, request_id: Uuid) -> Result<Vec<Attachment>> {
    sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {} FROM attachments WHERE request_id = $1 ORDER BY created_at ASC, id ASC",
        ATTACHMENT_COLUMNS
    ))
    .bind(request_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list attachments: {:?}", e);
        AppError::Database(e)
    })
}

/// Reject empty and oversized uploads
pub fn validate_upload_size(size: usize, max_size: usize) -> Result<()> {
    if size == 0 {
        return Err(AppError::Validation("File is empty".to_string()));
    }

    if size > max_size {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {} bytes ({} MiB)",
            max_size,
            max_size / 1024 / 1024
        )));
    }

    Ok(())
}

/// New random storage key keeping the original extension, e.g. `<uuid>.pdf`
pub fn storage_key_for(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}{}", Uuid::now_v7(), extension)
}

/// Service for files attached to purchase requests
pub struct AttachmentService {
    pool: PgPool,
    requests: Arc<RequestService>,
    storage: Arc<dyn BlobStore>,
    max_size: usize,
}

impl AttachmentService {
    pub fn new(
        pool: PgPool,
        requests: Arc<RequestService>,
        storage: Arc<dyn BlobStore>,
        max_size: usize,
    ) -> Self {
        Self {
            pool,
            requests,
            storage,
            max_size,
        }
    }

    /// Store a file on a request (owning employee only)
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        file: UploadedFile,
    ) -> Result<AttachmentResponseDto> {
        let request = self.requests.find(request_id).await?;
        ensure_owner(user, &request.participants())?;
        validate_upload_size(file.data.len(), self.max_size)?;

        let storage_key = storage_key_for(&file.file_name);
        self.storage.save(&storage_key, &file.data).await?;

        let inserted = sqlx::query_as::<_, Attachment>(&format!(
            r#"
            INSERT INTO attachments (id, request_id, storage_key, mime_type, file_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ATTACHMENT_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(request.id)
        .bind(&storage_key)
        .bind(&file.content_type)
        .bind(file.data.len() as i64)
        .fetch_one(&self.pool)
        .await;

        let attachment = match inserted {
            Ok(attachment) => attachment,
            Err(e) => {
                tracing::error!("Failed to record attachment: {:?}", e);
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    tracing::warn!("Failed to remove orphaned file {}: {}", storage_key, cleanup);
                }
                return Err(AppError::Database(e));
            }
        };

        tracing::info!(
            "Attachment {} ({} bytes) added to request {}",
            attachment.id,
            attachment.file_size,
            request.id
        );

        Ok(attachment.into())
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
    ) -> Result<Vec<AttachmentResponseDto>> {
        self.requests.get_for_participant(user, request_id).await?;

        let attachments = list_for_request(&self.pool, request_id).await?;
        Ok(attachments.into_iter().map(AttachmentResponseDto::from).collect())
    }

    /// Return the attachment record and its bytes
    pub async fn download(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(Attachment, Vec<u8>)> {
        let attachment = self.find(id).await?;
        self.requests
            .get_for_participant(user, attachment.request_id)
            .await?;

        let data = self.storage.read(&attachment.storage_key).await?;
        Ok((attachment, data))
    }

    /// Delete the file, then the row. When the file is already gone the
    /// row is kept and the call fails with `NotFound`.
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let attachment = self.find(id).await?;
        self.requests
            .get_for_participant(user, attachment.request_id)
            .await?;

        self.storage
            .delete(&attachment.storage_key)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    tracing::warn!(
                        "Attachment {} has no file at '{}'",
                        attachment.id,
                        attachment.storage_key
                    );
                    AppError::NotFound("The attachment's file is missing from storage".to_string())
                }
                other => other,
            })?;

        sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(attachment.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete attachment row: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Attachment {} deleted by {}", attachment.id, user.id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Attachment> {
        sqlx::query_as::<_, Attachment>(&format!(
            "SELECT {} FROM attachments WHERE id = $1",
            ATTACHMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find attachment: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Attachment {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_size_limits() {
        let max = 5 * 1024 * 1024;

        assert!(validate_upload_size(1, max).is_ok());
        assert!(validate_upload_size(max, max).is_ok());
        assert!(matches!(
            validate_upload_size(0, max),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_upload_size(max + 1, max),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_storage_key_keeps_extension() {
        let key = storage_key_for("Quote March.PDF");
        assert!(key.ends_with(".pdf"));
        assert!(Uuid::parse_str(key.trim_end_matches(".pdf")).is_ok());
    }

    #[test]
    fn test_storage_key_without_usable_extension() {
        let key = storage_key_for("README");
        assert!(Uuid::parse_str(&key).is_ok());

        let key = storage_key_for("evil.p/hp");
        assert!(!key.contains('/'));
    }

    #[test]
    fn test_storage_keys_are_unique() {
        assert_ne!(storage_key_for("a.png"), storage_key_for("a.png"));
    }
}
