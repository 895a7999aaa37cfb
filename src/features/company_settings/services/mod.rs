pub mod company_settings_service;

pub use company_settings_service::CompanySettingsService;
