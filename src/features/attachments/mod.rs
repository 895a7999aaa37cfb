//! Files attached to purchase requests.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/Attachments/request/{requestId}` | Upload a file (owner, at most 5 MiB) |
//! | GET | `/api/Attachments/request/{requestId}` | List attachments |
//! | GET | `/api/Attachments/{id}/download` | Stream the file |
//! | DELETE | `/api/Attachments/{id}` | Delete file and record |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AttachmentService;
