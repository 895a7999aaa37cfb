pub mod note_service;

pub use note_service::{insert_note, list_for_request, NoteService};
