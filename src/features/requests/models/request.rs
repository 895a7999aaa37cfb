use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::policy::RequestParticipants;

/// Request status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Waiting,
    Approved,
    Rejected,
    Purchased,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Waiting => "waiting",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Purchased => "purchased",
        }
    }

    /// Only waiting requests can be edited or decided
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Waiting)
    }

    /// Validate a decision on a request currently in `self`.
    ///
    /// `waiting` is never a valid target; every other status is terminal.
    pub fn transition_to(self, target: RequestStatus) -> Result<RequestStatus> {
        if target == RequestStatus::Waiting {
            return Err(AppError::Validation(format!(
                "Invalid status '{}': a request can only be approved, rejected or marked purchased",
                target
            )));
        }

        if !self.is_pending() {
            return Err(AppError::Validation(format!(
                "Request is already {} and can no longer change",
                self
            )));
        }

        Ok(target)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for a purchase request
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reason: String,
    pub url: String,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub ai_score: Option<f64>,
    pub ai_score_generated_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PurchaseRequest {
    pub fn participants(&self) -> RequestParticipants {
        RequestParticipants {
            owner_id: self.user_id,
            manager_id: self.manager_id,
        }
    }
}

/// Purchase request joined with owner and manager display fields
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseRequestView {
    #[sqlx(flatten)]
    pub request: PurchaseRequest,
    pub owner_name: String,
    pub owner_email: String,
    pub manager_name: String,
    pub manager_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECISIONS: [RequestStatus; 3] = [
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Purchased,
    ];

    #[test]
    fn test_waiting_can_move_to_any_decision() {
        for target in DECISIONS {
            assert_eq!(RequestStatus::Waiting.transition_to(target).unwrap(), target);
        }
    }

    #[test]
    fn test_terminal_statuses_never_move() {
        for current in DECISIONS {
            for target in DECISIONS {
                assert!(matches!(
                    current.transition_to(target),
                    Err(AppError::Validation(_))
                ));
            }
        }
    }

    #[test]
    fn test_nothing_moves_back_to_waiting() {
        for current in [RequestStatus::Waiting, RequestStatus::Approved] {
            let err = current.transition_to(RequestStatus::Waiting).unwrap_err();
            assert!(err.to_string().contains("Invalid status"));
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Purchased).unwrap(),
            "\"purchased\""
        );
        assert!(serde_json::from_str::<RequestStatus>("\"cancelled\"").is_err());
    }
}
