pub mod attachments;
pub mod auth;
pub mod company_settings;
pub mod export;
pub mod notes;
pub mod notifications;
pub mod requests;
pub mod scoring;
pub mod users;
