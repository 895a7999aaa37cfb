//! Purchase requests and their lifecycle.
//!
//! A request starts `waiting` and is assigned once, at creation, to the
//! manager with the smallest spend limit covering its amount (or the admin).
//! The owner may edit it while it waits; the assigned manager or an admin
//! then moves it to `approved`, `rejected` or `purchased`, all terminal.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/Requests` | Role-scoped list with filters, sort and paging |
//! | POST | `/api/Requests` | Create (employee) |
//! | GET | `/api/Requests/{id}` | Detail with notes and attachments |
//! | PUT | `/api/Requests/{id}` | Edit while waiting (owner) |
//! | PATCH | `/api/Requests/{id}/status` | Decide (assigned manager or admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::RequestService;
