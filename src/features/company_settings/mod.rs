//! Company settings: a single description used as context when scoring requests.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/CompanySettings` | Read settings |
//! | PUT | `/api/CompanySettings` | Replace the description (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CompanySettingsService;
