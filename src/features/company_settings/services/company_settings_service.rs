use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::company_settings::dtos::UpdateCompanySettingsDto;
use crate::features::company_settings::models::CompanySettings;

/// Service for the singleton company settings row
pub struct CompanySettingsService {
    pool: PgPool,
}

impl CompanySettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<CompanySettings> {
        sqlx::query_as::<_, CompanySettings>(
            "SELECT description, updated_at FROM company_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load company settings: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Internal("Company settings row is missing".to_string()))
    }

    /// Company description for prompts, `None` when blank
    pub async fn context(&self) -> Result<Option<String>> {
        let settings = self.get().await?;
        let description = settings.description.trim();

        Ok((!description.is_empty()).then(|| description.to_string()))
    }

    pub async fn update(&self, dto: UpdateCompanySettingsDto) -> Result<CompanySettings> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            INSERT INTO company_settings (id, description, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE
            SET description = EXCLUDED.description, updated_at = EXCLUDED.updated_at
            RETURNING description, updated_at
            "#,
        )
        .bind(dto.description.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update company settings: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Company settings updated");
        Ok(settings)
    }
}
