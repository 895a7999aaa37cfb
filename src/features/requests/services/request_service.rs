use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dtos::AttachmentResponseDto;
use crate::features::attachments::services::list_for_request as list_attachments;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{ensure_can_change_status, ensure_owner, ensure_participant};
use crate::features::notes::dtos::NoteResponseDto;
use crate::features::notes::services::{insert_note, list_for_request as list_notes};
use crate::features::notifications::{NotificationDispatcher, NotificationEvent};
use crate::features::requests::dtos::{
    ChangeStatusDto, CreateRequestDto, RequestDetailDto, RequestQueryParams, RequestResponseDto,
    UpdateRequestDto,
};
use crate::features::requests::models::{
    PurchaseRequest, PurchaseRequestView, RequestStatus,
};
use crate::features::requests::services::approver::{select_approver, ApproverCandidate};
use crate::features::requests::services::scope::{
    scoped_query, RequestFilter, RequestScope, RequestSort, VIEW_COLUMNS,
};
use crate::features::scoring::ScoringService;
use crate::features::users::models::Role;
use crate::shared::constants::MAX_REQUEST_AMOUNT;

const REQUEST_COLUMNS: &str = "id, title, description, reason, url, amount, status, ai_score, \
     ai_score_generated_at, user_id, manager_id, created_at, updated_at";

/// Round to cents the way the `NUMERIC(12,2)` column stores it, then check the
/// result lies in (0, 100000]
pub fn normalize_amount(amount: Decimal) -> Result<Decimal> {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if amount <= Decimal::ZERO || amount > Decimal::from(MAX_REQUEST_AMOUNT) {
        return Err(AppError::Validation(format!(
            "Amount must be greater than 0 and at most {}",
            MAX_REQUEST_AMOUNT
        )));
    }
    Ok(amount)
}

/// Audit note written by a status change
pub fn status_change_note(from: RequestStatus, to: RequestStatus, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("Status changed from {} to {}. Reason: {}", from, to, reason),
        None => format!("Status changed from {} to {}.", from, to),
    }
}

/// Service for the purchase request lifecycle
pub struct RequestService {
    pool: PgPool,
    notifier: Arc<NotificationDispatcher>,
    scoring: Arc<ScoringService>,
}

impl RequestService {
    pub fn new(
        pool: PgPool,
        notifier: Arc<NotificationDispatcher>,
        scoring: Arc<ScoringService>,
    ) -> Self {
        Self {
            pool,
            notifier,
            scoring,
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<PurchaseRequest> {
        sqlx::query_as::<_, PurchaseRequest>(&format!(
            "SELECT {} FROM requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find request: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Load a request the caller is a participant of
    pub async fn get_for_participant(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<PurchaseRequest> {
        let request = self.find(id).await?;
        ensure_participant(user, &request.participants())?;
        Ok(request)
    }

    async fn find_view(&self, id: Uuid) -> Result<PurchaseRequestView> {
        let mut query = scoped_query(VIEW_COLUMNS, RequestScope::All, &RequestFilter::default());
        query.push(" AND r.id = ").push_bind(id);

        query
            .build_query_as::<PurchaseRequestView>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load request view: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Create a request and assign its approver
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateRequestDto,
    ) -> Result<RequestResponseDto> {
        if user.role != Role::Employee {
            return Err(AppError::Forbidden(
                "Only employees can create purchase requests".to_string(),
            ));
        }
        let amount = normalize_amount(dto.amount)?;

        let candidates = sqlx::query_as::<_, ApproverCandidate>(
            r#"
            SELECT id, role, manager_limit
            FROM users
            WHERE is_deleted = FALSE AND role IN ('admin', 'manager')
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load approvers: {:?}", e);
            AppError::Database(e)
        })?;

        let manager_id = select_approver(amount, &candidates)?;

        let request = sqlx::query_as::<_, PurchaseRequest>(&format!(
            r#"
            INSERT INTO requests (id, title, description, reason, url, amount, status, user_id, manager_id)
            VALUES ($1, $2, $3, $4, $5, $6, 'waiting', $7, $8)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(dto.reason.trim())
        .bind(dto.url.trim())
        .bind(amount)
        .bind(user.id)
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create request: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Request {} created by {} for {}, assigned to {}",
            request.id,
            user.id,
            request.amount,
            manager_id
        );

        self.scoring.score_in_background(request.id);

        Ok(self.find_view(request.id).await?.into())
    }

    /// Partial edit by the owning employee while the request is waiting
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateRequestDto,
    ) -> Result<RequestResponseDto> {
        let request = self.find(id).await?;
        ensure_owner(user, &request.participants())?;

        if !request.status.is_pending() {
            return Err(not_editable(request.status));
        }
        let amount = dto.amount.map(normalize_amount).transpose()?;
        if dto.is_empty() {
            return Ok(self.find_view(id).await?.into());
        }

        let updated = sqlx::query(
            r#"
            UPDATE requests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                reason = COALESCE($4, reason),
                url = COALESCE($5, url),
                amount = COALESCE($6, amount),
                updated_at = NOW()
            WHERE id = $1 AND status = 'waiting'
            "#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(dto.description.as_deref().map(str::trim))
        .bind(dto.reason.as_deref().map(str::trim))
        .bind(dto.url.as_deref().map(str::trim))
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update request: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected();

        // Decided between our read and the write
        if updated == 0 {
            let current = self.find(id).await?;
            return Err(not_editable(current.status));
        }

        tracing::info!("Request {} edited by {}", id, user.id);
        Ok(self.find_view(id).await?.into())
    }

    /// Decide a waiting request and record the decision as a note
    pub async fn change_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: ChangeStatusDto,
    ) -> Result<RequestResponseDto> {
        let request = self.find(id).await?;
        ensure_can_change_status(user, &request.participants())?;

        let target = request.status.transition_to(dto.status)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let updated = sqlx::query(
            "UPDATE requests SET status = $2, updated_at = NOW() WHERE id = $1 AND status = 'waiting'",
        )
        .bind(id)
        .bind(target)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to change request status: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected();

        if updated == 0 {
            return Err(not_editable(self.find(id).await?.status));
        }

        let note = status_change_note(request.status, target, dto.reason.as_deref());
        insert_note(&mut *tx, id, user.id, &note).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status change: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Request {} moved {} -> {} by {}",
            id,
            request.status,
            target,
            user.id
        );

        self.notifier.emit(NotificationEvent::StatusChanged {
            request_id: id,
            title: request.title.clone(),
            owner_id: request.user_id,
            actor_id: user.id,
            status: target,
            reason: dto.reason.filter(|r| !r.trim().is_empty()),
        });

        Ok(self.find_view(id).await?.into())
    }

    /// A request with its notes and attachments
    pub async fn get_detail(&self, user: &AuthenticatedUser, id: Uuid) -> Result<RequestDetailDto> {
        let view = self.find_view(id).await?;
        ensure_participant(user, &view.request.participants())?;

        let notes = list_notes(&self.pool, id).await?;
        let attachments = list_attachments(&self.pool, id).await?;

        Ok(RequestDetailDto {
            request: view.into(),
            notes: notes.into_iter().map(NoteResponseDto::from).collect(),
            attachments: attachments
                .into_iter()
                .map(AttachmentResponseDto::from)
                .collect(),
        })
    }

    /// Role-scoped, filtered, sorted page of requests
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: &RequestQueryParams,
    ) -> Result<(Vec<RequestResponseDto>, i64)> {
        let scope = RequestScope::for_user(user);
        let filter = params.filter();

        let total: i64 = scoped_query("COUNT(*)", scope, &filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count requests: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query = scoped_query(VIEW_COLUMNS, scope, &filter);
        params.sort().push_order_by(&mut query);
        let window = params.window();
        query
            .push(" OFFSET ")
            .push_bind(window.offset)
            .push(" LIMIT ")
            .push_bind(window.limit);

        let rows = query
            .build_query_as::<PurchaseRequestView>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list requests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(RequestResponseDto::from).collect(), total))
    }

    /// Every request matching the filter within the caller's scope, unpaged
    pub async fn list_all(
        &self,
        user: &AuthenticatedUser,
        filter: &RequestFilter,
        sort: RequestSort,
    ) -> Result<Vec<PurchaseRequestView>> {
        let mut query = scoped_query(VIEW_COLUMNS, RequestScope::for_user(user), filter);
        sort.push_order_by(&mut query);

        query
            .build_query_as::<PurchaseRequestView>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load requests for export: {:?}", e);
                AppError::Database(e)
            })
    }
}

fn not_editable(status: RequestStatus) -> AppError {
    AppError::Validation(format!(
        "Request is already {} and can no longer be changed",
        status
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_bounds() {
        assert!(normalize_amount(Decimal::new(1, 2)).is_ok());
        assert!(normalize_amount(Decimal::from(3000)).is_ok());
        assert!(normalize_amount(Decimal::from(100_000)).is_ok());

        for bad in [
            Decimal::ZERO,
            Decimal::from(-5),
            Decimal::new(10_000_001, 2),
            Decimal::from(500_000),
            Decimal::new(4, 3),
            Decimal::new(100_000_005, 3),
        ] {
            assert!(
                matches!(normalize_amount(bad), Err(AppError::Validation(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_amount_is_rounded_to_cents_before_routing() {
        let amount = normalize_amount(Decimal::new(2_000_004, 3)).unwrap();
        assert_eq!(amount, Decimal::new(200_000, 2));
        assert_eq!(
            normalize_amount(Decimal::new(1_234_565, 3)).unwrap(),
            Decimal::new(123_457, 2)
        );

        let manager = Uuid::now_v7();
        let candidates = vec![ApproverCandidate {
            id: manager,
            role: Role::Manager,
            manager_limit: Some(Decimal::from(2000)),
        }];
        assert_eq!(select_approver(amount, &candidates).unwrap(), manager);
    }

    #[test]
    fn test_status_change_note_text() {
        assert_eq!(
            status_change_note(RequestStatus::Waiting, RequestStatus::Approved, None),
            "Status changed from waiting to approved."
        );
        assert_eq!(
            status_change_note(
                RequestStatus::Waiting,
                RequestStatus::Rejected,
                Some("  Over budget  ")
            ),
            "Status changed from waiting to rejected. Reason: Over budget"
        );
        assert_eq!(
            status_change_note(RequestStatus::Waiting, RequestStatus::Purchased, Some(" ")),
            "Status changed from waiting to purchased."
        );
    }

    #[test]
    fn test_not_editable_message() {
        let err = not_editable(RequestStatus::Approved);
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("already approved")));
    }
}
