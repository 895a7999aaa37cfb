pub mod company_settings_dto;

pub use company_settings_dto::*;
