use std::sync::Arc;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{ensure_note_author, ensure_participant};
use crate::features::notes::dtos::{NoteBodyDto, NoteResponseDto};
use crate::features::notes::models::{MyNoteWrite, Note, NoteView};
use crate::features::notifications::{NotificationDispatcher, NotificationEvent};
use crate::features::requests::models::PurchaseRequest;
use crate::features::requests::services::RequestService;

const NOTE_VIEW_SELECT: &str = "SELECT n.id, n.request_id, n.author_id, n.body, n.created_at, \
     n.updated_at, u.full_name AS author_name FROM notes n JOIN users u ON u.id = n.author_id";

/// Insert a note and return it with its author's name.
///
/// Takes any executor so status changes can write their audit note inside
/// their own transaction.
pub async fn insert_note<'e, E>(
    executor: E,
    request_id: Uuid,
    author_id: Uuid,
    body: &str,
) -> Result<NoteView>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, NoteView>(
        r#"
        WITH inserted AS (
            INSERT INTO notes (id, request_id, author_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, request_id, author_id, body, created_at, updated_at
        )
        SELECT inserted.*, u.full_name AS author_name
        FROM inserted JOIN users u ON u.id = inserted.author_id
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(request_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert note: {:?}", e);
        AppError::Database(e)
    })
}

/// All notes of a request, oldest first
pub async fn list_for_request(pool: &PgPool, request_id: Uuid) -> Result<Vec<NoteView>> {
    sqlx::query_as::<_, NoteView>(&format!(
        "{} WHERE n.request_id = $1 ORDER BY n.created_at ASC, n.id ASC",
        NOTE_VIEW_SELECT
    ))
    .bind(request_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list notes: {:?}", e);
        AppError::Database(e)
    })
}

/// Service for notes on purchase requests
///
/// Two access patterns coexist: a thread of many notes per request
/// (`add`, `update`, `delete`) and one note per author (`upsert_mine`, which
/// rewrites the caller's latest note).
pub struct NoteService {
    pool: PgPool,
    requests: Arc<RequestService>,
    notifier: Arc<NotificationDispatcher>,
}

impl NoteService {
    pub fn new(
        pool: PgPool,
        requests: Arc<RequestService>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            requests,
            notifier,
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
    ) -> Result<Vec<NoteResponseDto>> {
        self.requests.get_for_participant(user, request_id).await?;

        let notes = list_for_request(&self.pool, request_id).await?;
        Ok(notes.into_iter().map(NoteResponseDto::from).collect())
    }

    pub async fn add(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: NoteBodyDto,
    ) -> Result<NoteResponseDto> {
        let request = self.requests.get_for_participant(user, request_id).await?;

        let note = insert_note(&self.pool, request.id, user.id, dto.body.trim()).await?;
        tracing::info!("Note {} added to request {} by {}", note.note.id, request.id, user.id);

        self.notify_note_added(&request, &note.note);
        Ok(note.into())
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        note_id: Uuid,
        dto: NoteBodyDto,
    ) -> Result<NoteResponseDto> {
        let note = self.find(note_id).await?;
        let request = self.requests.find(note.request_id).await?;
        ensure_note_author(user, &request.participants(), note.author_id)?;

        let updated = self.update_body(note.id, dto.body.trim()).await?;
        Ok(updated.into())
    }

    pub async fn delete(&self, user: &AuthenticatedUser, note_id: Uuid) -> Result<()> {
        let note = self.find(note_id).await?;
        let request = self.requests.find(note.request_id).await?;
        ensure_note_author(user, &request.participants(), note.author_id)?;

        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete note: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Note {} deleted by {}", note.id, user.id);
        Ok(())
    }

    /// Set the caller's note on a request: rewrite their latest note, or
    /// create one when they have none. Returns the note and which write happened.
    pub async fn upsert_mine(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: NoteBodyDto,
    ) -> Result<(NoteResponseDto, MyNoteWrite)> {
        let request = self.requests.find(request_id).await?;
        ensure_participant(user, &request.participants())?;

        let own_notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, request_id, author_id, body, created_at, updated_at
            FROM notes
            WHERE request_id = $1 AND author_id = $2
            "#,
        )
        .bind(request_id)
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load caller notes: {:?}", e);
            AppError::Database(e)
        })?;

        match MyNoteWrite::choose(&own_notes, user.id) {
            MyNoteWrite::Rewrite(note_id) => {
                let updated = self.update_body(note_id, dto.body.trim()).await?;
                Ok((updated.into(), MyNoteWrite::Rewrite(note_id)))
            }
            MyNoteWrite::Create => {
                let created = insert_note(&self.pool, request.id, user.id, dto.body.trim()).await?;
                self.notify_note_added(&request, &created.note);
                Ok((created.into(), MyNoteWrite::Create))
            }
        }
    }

    async fn find(&self, note_id: Uuid) -> Result<Note> {
        sqlx::query_as::<_, Note>(
            "SELECT id, request_id, author_id, body, created_at, updated_at FROM notes WHERE id = $1",
        )
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find note: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Note {} not found", note_id)))
    }

    async fn update_body(&self, note_id: Uuid, body: &str) -> Result<NoteView> {
        sqlx::query_as::<_, NoteView>(
            r#"
            WITH updated AS (
                UPDATE notes SET body = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING id, request_id, author_id, body, created_at, updated_at
            )
            SELECT updated.*, u.full_name AS author_name
            FROM updated JOIN users u ON u.id = updated.author_id
            "#,
        )
        .bind(note_id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update note: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Note {} not found", note_id)))
    }

    fn notify_note_added(&self, request: &PurchaseRequest, note: &Note) {
        self.notifier.emit(NotificationEvent::NoteAdded {
            request_id: request.id,
            title: request.title.clone(),
            manager_id: request.manager_id,
            author_id: note.author_id,
            body: note.body.clone(),
        });
    }
}
