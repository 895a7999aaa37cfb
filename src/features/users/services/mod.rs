mod user_service;

pub use user_service::{validate_manager_limit, UserService};
