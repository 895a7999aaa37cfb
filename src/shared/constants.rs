/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// PURCHASE REQUESTS
// =============================================================================

/// Largest amount a single purchase request may ask for
pub const MAX_REQUEST_AMOUNT: i64 = 100_000;

/// Score stored when the scoring oracle fails
pub const FALLBACK_AI_SCORE: f64 = 5.0;

/// Inclusive bounds of the usefulness score
pub const MIN_AI_SCORE: f64 = 0.0;
pub const MAX_AI_SCORE: f64 = 10.0;
