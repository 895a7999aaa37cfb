//! User accounts.
//!
//! Accounts are created by an admin (or seeded at startup) and soft-deleted,
//! never removed, so requests and notes keep their history.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/Users` | List active users (admin) |
//! | POST | `/api/Users` | Create a user (admin) |
//! | DELETE | `/api/Users/{id}` | Soft-delete a user (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
