pub mod scoring_handler;

pub use scoring_handler::*;
