//! Notes on purchase requests.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/Notes/request/{requestId}` | Notes of a request |
//! | POST | `/api/Notes/request/{requestId}` | Add a note |
//! | PUT | `/api/Notes/request/{requestId}/mine` | Set the caller's own note |
//! | PUT | `/api/Notes/{id}` | Edit a note (author) |
//! | DELETE | `/api/Notes/{id}` | Delete a note (author) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NoteService;
