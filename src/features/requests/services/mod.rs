pub mod approver;
pub mod request_service;
pub mod scope;

pub use request_service::RequestService;
