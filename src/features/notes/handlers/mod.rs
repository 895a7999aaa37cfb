pub mod note_handler;

pub use note_handler::*;
