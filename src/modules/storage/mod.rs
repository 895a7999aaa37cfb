//! Storage module for attachment files
//!
//! Files are addressed by a flat storage key (a random id plus the original
//! extension) and kept in a local directory.

mod local_storage;

pub use local_storage::{BlobStore, LocalFileStorage};
