//! Request export
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | GET | /api/export | authenticated |
//! | GET | /api/Perla/export | authenticated |
//!
//! Accepts the list filters without paging and applies the same role scoping
//! as the request list.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
