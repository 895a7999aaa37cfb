//! Persistence behind scoring: which requests lack a score, and writing one.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::company_settings::CompanySettingsService;

/// Fields of an unscored request that the oracle sees
#[derive(Debug, Clone, FromRow)]
pub struct UnscoredRequest {
    pub title: String,
    pub description: String,
    pub reason: String,
    pub amount: Decimal,
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Ids of requests without a score, oldest first
    async fn unscored_ids(&self) -> Result<Vec<Uuid>>;

    /// The request, if it exists and has no score yet
    async fn load_unscored(&self, request_id: Uuid) -> Result<Option<UnscoredRequest>>;

    /// Company description used as prompt context
    async fn company_context(&self) -> Result<Option<String>>;

    /// Write the score unless one is already set. Returns whether it was written.
    async fn store_score(&self, request_id: Uuid, score: f64) -> Result<bool>;
}

pub struct PgScoreStore {
    pool: PgPool,
    settings: Arc<CompanySettingsService>,
}

impl PgScoreStore {
    pub fn new(pool: PgPool, settings: Arc<CompanySettingsService>) -> Self {
        Self { pool, settings }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn unscored_ids(&self) -> Result<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM requests WHERE ai_score IS NULL ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list unscored requests: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn load_unscored(&self, request_id: Uuid) -> Result<Option<UnscoredRequest>> {
        sqlx::query_as::<_, UnscoredRequest>(
            "SELECT title, description, reason, amount FROM requests WHERE id = $1 AND ai_score IS NULL",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load request for scoring: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn company_context(&self) -> Result<Option<String>> {
        self.settings.context().await
    }

    async fn store_score(&self, request_id: Uuid, score: f64) -> Result<bool> {
        // Whoever writes first wins
        let updated = sqlx::query(
            r#"
            UPDATE requests
            SET ai_score = $2, ai_score_generated_at = NOW()
            WHERE id = $1 AND ai_score IS NULL
            "#,
        )
        .bind(request_id)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store score: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(updated.rows_affected() > 0)
    }
}
