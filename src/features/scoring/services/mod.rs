pub mod oracle;
pub mod scoring_service;
pub mod store;

pub use oracle::{ChatCompletionOracle, ScoringInput, ScoringOracle, UnconfiguredOracle};
pub use scoring_service::ScoringService;
