pub mod company_settings;

pub use company_settings::*;
