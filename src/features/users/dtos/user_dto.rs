use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{Role, User};
use crate::shared::types::{default_page, default_page_size, PageWindow};

/// Response DTO for user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[schema(value_type = Option<String>, example = "5000.00")]
    pub manager_limit: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            role: u.role,
            manager_limit: u.manager_limit,
            supervisor_id: u.supervisor_id,
            created_at: u.created_at,
        }
    }
}

/// Request DTO for creating a user (admin only)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub role: Role,

    /// Spend limit, only accepted for managers
    #[schema(value_type = Option<String>, example = "5000.00")]
    pub manager_limit: Option<Decimal>,

    /// Supervising manager
    pub supervisor_id: Option<Uuid>,
}

/// Query params for listing users
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by role
    pub role: Option<Role>,
}

impl UserQueryParams {
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }
}
