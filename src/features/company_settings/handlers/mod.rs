pub mod company_settings_handler;

pub use company_settings_handler::*;
