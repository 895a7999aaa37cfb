pub mod note_dto;

pub use note_dto::*;
