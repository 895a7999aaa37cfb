//! AI usefulness scoring of purchase requests
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | POST | /api/AI/generate-missing-scores | admin |
//!
//! New requests are scored in the background right after creation. Scores
//! are clamped to 0-10; when the model is unreachable or its reply cannot be
//! parsed the request gets a neutral 5.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ScoringService;
