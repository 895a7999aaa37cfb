use serde::Serialize;
use utoipa::ToSchema;

/// Result of a scoring backfill run
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ScoringSummaryDto {
    /// Requests that received a score
    pub scored: u32,

    /// How many of those got the neutral fallback score
    pub fallbacks: u32,

    /// Requests skipped because of an error
    pub failed: u32,
}
