//! Sessions, passwords and authorization rules.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/auth/login` | Verify credentials and set the session cookie |
//! | POST | `/auth/logout` | Clear the session cookie |
//! | PATCH | `/auth/change-password` | Change own password (rate limited) |
//! | GET | `/auth/me` | Current account |

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod password;
pub mod policy;
pub mod rate_limiter;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};
