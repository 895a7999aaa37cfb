use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::company_settings::models::CompanySettings;

/// Response DTO for company settings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanySettingsDto {
    /// Company description given to the scoring model as context
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanySettings> for CompanySettingsDto {
    fn from(s: CompanySettings) -> Self {
        Self {
            description: s.description,
            updated_at: s.updated_at,
        }
    }
}

/// Request DTO for replacing the company description (admin only)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanySettingsDto {
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: String,
}
