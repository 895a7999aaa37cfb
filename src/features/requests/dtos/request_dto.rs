use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::attachments::dtos::AttachmentResponseDto;
use crate::features::notes::dtos::NoteResponseDto;
use crate::features::requests::models::{PurchaseRequestView, RequestStatus};
use crate::features::requests::services::scope::{RequestFilter, RequestSort, RequestSortBy};
use crate::shared::types::{default_page, default_page_size, PageWindow};

// =============================================================================
// COMMON SORT ENUM
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

// =============================================================================
// WRITE DTOs
// =============================================================================

/// Request DTO for creating a purchase request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequestDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 2000, message = "Reason must be 1-2000 characters"))]
    pub reason: String,

    #[validate(url(message = "Invalid URL"))]
    pub url: String,

    /// Amount in (0, 100000]
    #[schema(value_type = String, example = "3000.00")]
    pub amount: Decimal,
}

/// Partial update of a waiting request; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRequestDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "Reason must be 1-2000 characters"))]
    pub reason: Option<String>,

    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,

    #[schema(value_type = Option<String>, example = "2500.00")]
    pub amount: Option<Decimal>,
}

impl UpdateRequestDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.reason.is_none()
            && self.url.is_none()
            && self.amount.is_none()
    }
}

/// Decision on a waiting request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangeStatusDto {
    pub status: RequestStatus,

    #[validate(length(max = 2000, message = "Reason must be at most 2000 characters"))]
    pub reason: Option<String>,
}

// =============================================================================
// QUERY DTOs
// =============================================================================

/// Query params for listing requests
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RequestQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by status
    pub status: Option<RequestStatus>,
    /// Minimum amount (inclusive)
    #[param(value_type = Option<String>)]
    pub min_amount: Option<Decimal>,
    /// Maximum amount (inclusive)
    #[param(value_type = Option<String>)]
    pub max_amount: Option<Decimal>,
    /// Created on or after (YYYY-MM-DD)
    pub from_date: Option<NaiveDate>,
    /// Created on or before (YYYY-MM-DD)
    pub to_date: Option<NaiveDate>,
    /// Search in the owner's name or email
    pub search: Option<String>,
    /// Sort by field (default: created_at)
    #[serde(default)]
    pub sort_by: RequestSortBy,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl RequestQueryParams {
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            from_date: self.from_date,
            to_date: self.to_date,
            search: self.search.clone(),
        }
    }

    pub fn sort(&self) -> RequestSort {
        RequestSort {
            by: self.sort_by,
            direction: self.sort,
        }
    }
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// A user shown alongside a request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// Response DTO for a purchase request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reason: String,
    pub url: String,
    #[schema(value_type = String, example = "3000.00")]
    pub amount: Decimal,
    pub status: RequestStatus,
    /// Usefulness score in [0, 10], absent until scored
    pub ai_score: Option<f64>,
    pub ai_score_generated_at: Option<DateTime<Utc>>,
    pub owner: PersonDto,
    pub manager: PersonDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<PurchaseRequestView> for RequestResponseDto {
    fn from(v: PurchaseRequestView) -> Self {
        let r = v.request;
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            reason: r.reason,
            url: r.url,
            amount: r.amount,
            status: r.status,
            ai_score: r.ai_score,
            ai_score_generated_at: r.ai_score_generated_at,
            owner: PersonDto {
                id: r.user_id,
                full_name: v.owner_name,
                email: v.owner_email,
            },
            manager: PersonDto {
                id: r.manager_id,
                full_name: v.manager_name,
                email: v.manager_email,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A request with its notes (oldest first) and attachments
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetailDto {
    pub request: RequestResponseDto,
    pub notes: Vec<NoteResponseDto>,
    pub attachments: Vec<AttachmentResponseDto>,
}
