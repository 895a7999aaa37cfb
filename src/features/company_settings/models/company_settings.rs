use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The single company settings row
#[derive(Debug, Clone, FromRow)]
pub struct CompanySettings {
    pub description: String,
    pub updated_at: DateTime<Utc>,
}
