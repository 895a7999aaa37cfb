//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for attachment storage and outbound email.

pub mod mailer;
pub mod storage;
