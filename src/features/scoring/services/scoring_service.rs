use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::company_settings::CompanySettingsService;
use crate::features::scoring::dtos::ScoringSummaryDto;
use crate::features::scoring::models::ScoreOutcome;
use crate::features::scoring::services::oracle::{ScoringInput, ScoringOracle};
use crate::features::scoring::services::store::{PgScoreStore, ScoreStore};

/// Fills `ai_score` on requests that do not have one yet
pub struct ScoringService {
    store: Arc<dyn ScoreStore>,
    oracle: Arc<dyn ScoringOracle>,
}

impl ScoringService {
    pub fn new(
        pool: PgPool,
        oracle: Arc<dyn ScoringOracle>,
        settings: Arc<CompanySettingsService>,
    ) -> Self {
        Self::with_store(Arc::new(PgScoreStore::new(pool, settings)), oracle)
    }

    pub fn with_store(store: Arc<dyn ScoreStore>, oracle: Arc<dyn ScoringOracle>) -> Self {
        Self { store, oracle }
    }

    /// Score a freshly created request without holding up the response
    pub fn score_in_background(self: &Arc<Self>, request_id: Uuid) {
        let this = Arc::clone(self);

        tokio::spawn(async move {
            if let Err(e) = this.score_request(request_id).await {
                tracing::warn!("Background scoring of request {} failed: {}", request_id, e);
            }
        });
    }

    /// Score every request still missing a score, oldest first
    pub async fn generate_missing_scores(&self) -> Result<ScoringSummaryDto> {
        let ids = self.store.unscored_ids().await?;
        let mut summary = ScoringSummaryDto::default();

        for id in ids {
            match self.score_request(id).await {
                Ok(Some(outcome)) => {
                    summary.scored += 1;
                    if outcome.fallback {
                        summary.fallbacks += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Skipping request {} while scoring: {}", id, e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Scoring backfill done: {} scored, {} fallbacks, {} failed",
            summary.scored,
            summary.fallbacks,
            summary.failed
        );

        Ok(summary)
    }

    /// Score one request. Returns `None` when it already had a score.
    pub async fn score_request(&self, request_id: Uuid) -> Result<Option<ScoreOutcome>> {
        let Some(request) = self.store.load_unscored(request_id).await? else {
            return Ok(None);
        };

        let company_context = match self.store.company_context().await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!("Scoring without company context: {}", e);
                None
            }
        };

        let input = ScoringInput {
            title: request.title,
            description: request.description,
            reason: request.reason,
            amount: request.amount,
            company_context,
        };

        let result = self.oracle.score(&input).await;
        if let Err(e) = &result {
            tracing::warn!("Scoring oracle failed for request {}: {}", request_id, e);
        }
        let outcome = ScoreOutcome::resolve(result);

        if !self.store.store_score(request_id, outcome.score).await? {
            return Ok(None);
        }

        tracing::debug!(
            "Request {} scored {} (fallback: {})",
            request_id,
            outcome.score,
            outcome.fallback
        );

        Ok(Some(outcome))
    }
}
