//! Parsing of free-form LLM replies into typed values.

mod parser;
mod response;

pub use parser::parse_with_fallback;
pub use response::LlmResponse;
