pub mod scoring_dto;

pub use scoring_dto::*;
